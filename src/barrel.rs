//! Barrel Calculator
//!
//! Builds the aggregator of a folder that has none: the printed module, the
//! manifest of every identifier it exports and the warnings found on the way.
//! Calculation is a pure function of the folder contents, so running it twice
//! on an unchanged folder gives identical text and an equal manifest.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::diagnostic::Diagnostic;
use crate::directory::get_directory_files;
use crate::exports::{exports_of_source, EntityWithIdentifier, ExportedEntity};
use crate::extensions::extension_of;
use crate::fs::FileSystem;
use crate::options::CompilerOptions;
use crate::specifier::origin_specifier;
use crate::syntax::{coalesce_exports, print_module, ExportDeclaration, ExportSpecifier, Statement};

/// Manifest of one barrel, keyed by public identifier.
pub type ExportedEntities = IndexMap<String, EntityWithIdentifier>;

/// A synthesized aggregator and its manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarrelFile {
    pub statements: Vec<Statement>,
    pub text: String,
    pub barrel_entities: ExportedEntities,
}

#[derive(Debug, Clone)]
pub struct BarrelCalculation {
    pub statements: Vec<Statement>,
    pub text: String,
    /// Every file enumerated for the folder, in listing order.
    pub included_files: Vec<PathBuf>,
    pub diagnostics: BTreeMap<PathBuf, Vec<Diagnostic>>,
    pub barrel_entities: ExportedEntities,
}

impl BarrelCalculation {
    pub fn into_barrel_file(self) -> BarrelFile {
        BarrelFile {
            statements: self.statements,
            text: self.text,
            barrel_entities: self.barrel_entities,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXTERNAL FILES
// ═══════════════════════════════════════════════════════════════════════════════

lazy_static! {
    static ref LOWER_UPPER: Regex = Regex::new(r"([a-z0-9])([A-Z])").unwrap();
    static ref UPPER_UPPER_LOWER: Regex = Regex::new(r"([A-Z])([A-Z][a-z])").unwrap();
    static ref NON_WORD: Regex = Regex::new(r"[^A-Za-z0-9]+").unwrap();
}

fn split_words(input: &str) -> Vec<String> {
    let split = LOWER_UPPER.replace_all(input, "$1\u{0}$2");
    let split = UPPER_UPPER_LOWER.replace_all(&split, "$1\u{0}$2");
    let split = NON_WORD.replace_all(&split, "\u{0}");
    split
        .split('\u{0}')
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

fn camel_case(input: &str) -> String {
    let mut out = String::new();
    for (index, word) in split_words(input).iter().enumerate() {
        if index == 0 {
            out.push_str(&word.to_lowercase());
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if first.is_ascii_digit() {
                out.push('_');
            }
            out.push(first.to_ascii_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}

/// Identifier for a file the extractor cannot read exports from: the camel
/// cased file name with its extension, keeping an upper-case first letter.
/// `Y-forwards.json` gives `YForwardsJson`, `z-forwards.json` gives
/// `zForwardsJson`.
pub fn identifier_for_external_file(file_name: &str) -> String {
    let camel = camel_case(file_name);
    let identifier = match file_name.chars().next() {
        Some(first) if first.is_uppercase() && !camel.is_empty() => {
            let mut rest = camel.chars();
            rest.next();
            format!("{}{}", first, rest.as_str())
        }
        _ => camel,
    };

    // A leading digit cannot start a binding.
    if identifier.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", identifier)
    } else {
        identifier
    }
}

/// Single default value export standing for a whole non-module file.
pub fn entity_for_external_file(path: &Path) -> EntityWithIdentifier {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    EntityWithIdentifier {
        identifier: identifier_for_external_file(&file_name),
        entity: ExportedEntity {
            extension: extension_of(path).unwrap_or_default().to_string(),
            file_name,
            is_default_export: true,
            is_type_export: false,
        },
        span: None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALCULATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Export statement of the aggregator re-exporting `entity`.
pub fn export_declaration_for(
    entity: &EntityWithIdentifier,
    options: &CompilerOptions,
) -> ExportDeclaration {
    let (module_specifier, assert_clause) = origin_specifier(".", &entity.entity, options);
    ExportDeclaration {
        specifiers: vec![ExportSpecifier {
            property_name: entity
                .entity
                .is_default_export
                .then(|| "default".to_string()),
            name: entity.identifier.clone(),
        }],
        module_specifier,
        assert_clause,
    }
}

pub fn calculate_barrel<F: FileSystem>(
    dir: &Path,
    options: &CompilerOptions,
    fs: &F,
) -> BarrelCalculation {
    let files = get_directory_files(dir, options, fs);

    let mut diagnostics: BTreeMap<PathBuf, Vec<Diagnostic>> = BTreeMap::new();
    let mut barrel_entities = ExportedEntities::new();
    let mut origins: BTreeMap<String, PathBuf> = BTreeMap::new();

    for file in &files {
        let Some(source) = fs.read_file(file) else {
            tracing::warn!(file = %file.display(), "listed file could not be read, no exports extracted");
            continue;
        };

        let entities = match exports_of_source(file, &source) {
            Some(result) => {
                if !result.diagnostics.is_empty() {
                    diagnostics
                        .entry(file.clone())
                        .or_default()
                        .extend(result.diagnostics);
                }
                result.entities
            }
            None => vec![entity_for_external_file(file)],
        };

        for entity in entities {
            if let Some(shadowed) = origins.get(&entity.identifier) {
                let span = entity.span.unwrap_or_default();
                tracing::warn!(
                    identifier = %entity.identifier,
                    file = %file.display(),
                    shadowed = %shadowed.display(),
                    "identifier exported by more than one file"
                );
                diagnostics
                    .entry(file.clone())
                    .or_default()
                    .push(Diagnostic::duplicate_identifier(
                        file,
                        &source,
                        span.start,
                        span.end,
                        &entity.identifier,
                        &shadowed.to_string_lossy(),
                    ));
            }
            origins.insert(entity.identifier.clone(), file.clone());
            barrel_entities.insert(entity.identifier.clone(), entity);
        }
    }

    let exports = barrel_entities
        .values()
        .map(|entity| export_declaration_for(entity, options))
        .collect();
    let statements: Vec<Statement> = coalesce_exports(exports)
        .into_iter()
        .map(Statement::Export)
        .collect();
    let text = print_module(&statements);

    tracing::debug!(
        folder = %dir.display(),
        files = files.len(),
        entities = barrel_entities.len(),
        "calculated barrel"
    );

    BarrelCalculation {
        statements,
        text,
        included_files: files,
        diagnostics,
        barrel_entities,
    }
}
