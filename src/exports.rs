//! Export Extractor
//!
//! Reads the export surface of one module from its syntax alone. Every
//! exported binding becomes an [`EntityWithIdentifier`]; bindings without a
//! derivable name are reported as warnings and left out.

use indexmap::IndexMap;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPattern, Declaration, ExportAllDeclaration, ExportDefaultDeclaration,
    ExportDefaultDeclarationKind, ExportNamedDeclaration, ExportSpecifier,
    ImportDeclarationSpecifier, ModuleExportName, Program, Statement, TSModuleDeclarationName,
};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::diagnostic::Diagnostic;
use crate::extensions::{extension_of, file_stem, is_code_extension};

// ═══════════════════════════════════════════════════════════════════════════════
// ENTITIES
// ═══════════════════════════════════════════════════════════════════════════════

/// One publicly visible symbol of one origin module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedEntity {
    /// Origin file name relative to its folder: the stem for code files
    /// (`a` for `a.ts`), the full name for external assets (`data.json`).
    pub file_name: String,
    /// Extension of the origin file (`.ts`, `.tsx`, `.json`, ...).
    #[serde(default)]
    pub extension: String,
    pub is_default_export: bool,
    pub is_type_export: bool,
}

/// An entity together with the public name used inside the barrel and at
/// rewritten import sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityWithIdentifier {
    pub identifier: String,
    #[serde(flatten)]
    pub entity: ExportedEntity,
    /// Span of the exporting declaration in the origin file.
    #[serde(skip)]
    pub span: Option<Span>,
}

impl EntityWithIdentifier {
    pub fn is_external(&self) -> bool {
        !is_code_extension(&self.entity.extension)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourceExports {
    pub entities: Vec<EntityWithIdentifier>,
    pub diagnostics: Vec<Diagnostic>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXTRACTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Extracts the exports of the module at `path` with content `source`.
///
/// Returns `None` when the file is not a module the host parses (JSON and
/// other assets); the caller falls back to a single default entity.
pub fn exports_of_source(path: &Path, source: &str) -> Option<SourceExports> {
    let extension = extension_of(path)?;
    if !is_code_extension(extension) {
        return None;
    }

    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path)
        .unwrap_or_else(|_| SourceType::default().with_typescript(true))
        .with_module(true);
    let ret = Parser::new(&allocator, source, source_type).parse();

    if ret.panicked {
        tracing::warn!(file = %path.display(), "unrecoverable parse error, no exports extracted");
        return Some(SourceExports::default());
    }

    if !has_module_syntax(&ret.program) {
        tracing::debug!(file = %path.display(), "script without module syntax contributes nothing");
        return Some(SourceExports::default());
    }

    let mut collector = ExportCollector {
        path,
        source,
        file_name: file_stem(path),
        extension,
        locals: collect_local_kinds(&ret.program),
        entities: IndexMap::new(),
        diagnostics: Vec::new(),
    };

    for stmt in &ret.program.body {
        match stmt {
            Statement::ExportNamedDeclaration(decl) => collector.named_export(decl),
            Statement::ExportDefaultDeclaration(decl) => collector.default_export(decl),
            Statement::ExportAllDeclaration(decl) => collector.star_export(decl),
            _ => {}
        }
    }

    Some(SourceExports {
        entities: collector.entities.into_values().collect(),
        diagnostics: collector.diagnostics,
    })
}

fn has_module_syntax(program: &Program) -> bool {
    program.body.iter().any(|stmt| {
        matches!(
            stmt,
            Statement::ImportDeclaration(_)
                | Statement::ExportNamedDeclaration(_)
                | Statement::ExportDefaultDeclaration(_)
                | Statement::ExportAllDeclaration(_)
                | Statement::TSExportAssignment(_)
                | Statement::TSImportEqualsDeclaration(_)
        )
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocalKind {
    Type,
    Value,
}

/// Top-level names of the module and whether they only exist as types.
fn collect_local_kinds(program: &Program) -> HashMap<String, LocalKind> {
    let mut locals = HashMap::new();
    let mut record = |name: String, kind: LocalKind| {
        let entry = locals.entry(name).or_insert(kind);
        if kind == LocalKind::Value {
            *entry = LocalKind::Value;
        }
    };

    for stmt in &program.body {
        let declaration = match stmt {
            Statement::ExportNamedDeclaration(decl) => decl.declaration.as_ref(),
            Statement::ImportDeclaration(decl) => {
                for specifier in decl.specifiers.iter().flatten() {
                    let (local, specifier_is_type) = match specifier {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            (&s.local, s.import_kind.is_type())
                        }
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => (&s.local, false),
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            (&s.local, false)
                        }
                    };
                    let kind = if decl.import_kind.is_type() || specifier_is_type {
                        LocalKind::Type
                    } else {
                        LocalKind::Value
                    };
                    record(local.name.to_string(), kind);
                }
                None
            }
            other => other.as_declaration(),
        };

        if let Some(declaration) = declaration {
            for (name, _, is_type) in declared_names(declaration) {
                let kind = if is_type {
                    LocalKind::Type
                } else {
                    LocalKind::Value
                };
                record(name, kind);
            }
        }
    }

    locals
}

/// Names introduced by a declaration with their spans and type-ness.
fn declared_names(declaration: &Declaration) -> Vec<(String, Span, bool)> {
    let mut names = Vec::new();
    match declaration {
        Declaration::VariableDeclaration(var) => {
            for declarator in &var.declarations {
                collect_binding_names(&declarator.id, &mut names);
            }
        }
        Declaration::FunctionDeclaration(func) => {
            if let Some(id) = &func.id {
                names.push((id.name.to_string(), func.span, false));
            }
        }
        Declaration::ClassDeclaration(class) => {
            if let Some(id) = &class.id {
                names.push((id.name.to_string(), class.span, false));
            }
        }
        Declaration::TSInterfaceDeclaration(decl) => {
            names.push((decl.id.name.to_string(), decl.span, true));
        }
        Declaration::TSTypeAliasDeclaration(decl) => {
            names.push((decl.id.name.to_string(), decl.span, true));
        }
        Declaration::TSEnumDeclaration(decl) => {
            names.push((decl.id.name.to_string(), decl.span, false));
        }
        Declaration::TSModuleDeclaration(decl) => {
            // `declare module "x"` augments another module and exports no name here.
            if let TSModuleDeclarationName::Identifier(id) = &decl.id {
                names.push((id.name.to_string(), decl.span, false));
            }
        }
        Declaration::TSImportEqualsDeclaration(decl) => {
            names.push((decl.id.name.to_string(), decl.span, false));
        }
        #[allow(unreachable_patterns)]
        _ => {}
    }
    names
}

fn collect_binding_names(pattern: &BindingPattern, names: &mut Vec<(String, Span, bool)>) {
    match pattern {
        BindingPattern::BindingIdentifier(id) => {
            names.push((id.name.to_string(), id.span, false));
        }
        BindingPattern::ObjectPattern(obj) => {
            for prop in &obj.properties {
                collect_binding_names(&prop.value, names);
            }
            if let Some(rest) = &obj.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        BindingPattern::ArrayPattern(arr) => {
            for pattern in arr.elements.iter().flatten() {
                collect_binding_names(pattern, names);
            }
            if let Some(rest) = &arr.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        BindingPattern::AssignmentPattern(assign) => {
            collect_binding_names(&assign.left, names);
        }
    }
}

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.to_string(),
        ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        ModuleExportName::StringLiteral(s) => s.value.to_string(),
    }
}

struct ExportCollector<'s> {
    path: &'s Path,
    source: &'s str,
    file_name: String,
    extension: &'static str,
    locals: HashMap<String, LocalKind>,
    entities: IndexMap<String, EntityWithIdentifier>,
    diagnostics: Vec<Diagnostic>,
}

impl<'s> ExportCollector<'s> {
    fn push(&mut self, identifier: String, span: Span, is_default_export: bool, is_type_export: bool) {
        // Declaration merging and overloads export one symbol under one name.
        if let Some(existing) = self.entities.get_mut(&identifier) {
            existing.entity.is_type_export &= is_type_export;
            return;
        }

        let entity = EntityWithIdentifier {
            identifier: identifier.clone(),
            entity: ExportedEntity {
                file_name: self.file_name.clone(),
                extension: self.extension.to_string(),
                is_default_export,
                is_type_export,
            },
            span: Some(span),
        };
        self.entities.insert(identifier, entity);
    }

    fn missing_identifier(&mut self, span: Span) {
        self.diagnostics.push(Diagnostic::missing_identifier(
            self.path,
            self.source,
            span.start,
            span.end,
        ));
    }

    fn is_local_type(&self, name: &str) -> bool {
        self.locals.get(name) == Some(&LocalKind::Type)
    }

    fn named_export(&mut self, decl: &ExportNamedDeclaration) {
        if let Some(declaration) = &decl.declaration {
            for (name, span, is_type) in declared_names(declaration) {
                self.push(name, span, false, is_type);
            }
        }

        for specifier in &decl.specifiers {
            self.export_specifier(decl, specifier);
        }
    }

    fn export_specifier(&mut self, decl: &ExportNamedDeclaration, specifier: &ExportSpecifier) {
        let local = export_name(&specifier.local);
        let exported = export_name(&specifier.exported);

        let is_type = decl.export_kind.is_type()
            || specifier.export_kind.is_type()
            || (decl.source.is_none() && self.is_local_type(&local));

        if exported == "default" {
            // `export { Thing as default }` keeps `Thing` as the public name.
            if local == "default" {
                self.missing_identifier(specifier.span);
            } else {
                self.push(local, specifier.span, true, is_type);
            }
            return;
        }

        self.push(exported, specifier.span, false, is_type);
    }

    fn default_export(&mut self, decl: &ExportDefaultDeclaration) {
        match &decl.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => match &func.id {
                Some(id) => self.push(id.name.to_string(), decl.span, true, false),
                None => self.missing_identifier(decl.span),
            },
            ExportDefaultDeclarationKind::ClassDeclaration(class) => match &class.id {
                Some(id) => self.push(id.name.to_string(), decl.span, true, false),
                None => self.missing_identifier(decl.span),
            },
            ExportDefaultDeclarationKind::TSInterfaceDeclaration(interface) => {
                self.push(interface.id.name.to_string(), decl.span, true, true)
            }
            ExportDefaultDeclarationKind::Identifier(ident) => {
                let name = ident.name.to_string();
                let is_type = self.is_local_type(&name);
                self.push(name, decl.span, true, is_type);
            }
            _ => self.missing_identifier(decl.span),
        }
    }

    fn star_export(&mut self, decl: &ExportAllDeclaration) {
        match &decl.exported {
            Some(exported) => {
                let name = export_name(exported);
                self.push(name, decl.span(), false, decl.export_kind.is_type());
            }
            // `export * from` re-exports names this module does not declare.
            None => self.missing_identifier(decl.span),
        }
    }
}
