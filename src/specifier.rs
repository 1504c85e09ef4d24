//! Module specifier conventions shared by barrel synthesis and import
//! rewriting.

use crate::exports::ExportedEntity;
use crate::extensions::{is_code_extension, output_extension, BARREL_STEM, KNOWN_EXTENSIONS};
use crate::options::CompilerOptions;
use crate::syntax::AssertClause;

/// Specifier (and assert clause) reaching the origin module of `entity`
/// from `base`, the specifier of the folder holding it.
pub fn origin_specifier(
    base: &str,
    entity: &ExportedEntity,
    options: &CompilerOptions,
) -> (String, Option<AssertClause>) {
    let base = base.trim_end_matches('/');
    let base = if base.is_empty() { "." } else { base };

    if !is_code_extension(&entity.extension) {
        let assert_clause = options
            .supports_import_attributes()
            .then(|| AssertClause::new(entity.extension.trim_start_matches('.')));
        return (format!("{}/{}", base, entity.file_name), assert_clause);
    }

    let specifier = if options.is_node_modern_resolution() {
        format!(
            "{}/{}{}",
            base,
            entity.file_name,
            output_extension(&entity.extension, options)
        )
    } else {
        format!("{}/{}", base, entity.file_name)
    };
    (specifier, None)
}

/// Folder part of a specifier that resolved to a barrel:
/// `./components/index.js` and `./components/` both give `./components`.
pub fn barrel_base_specifier(specifier: &str) -> String {
    let trimmed = specifier.trim_end_matches('/');

    if let Some((folder, last)) = trimmed.rsplit_once('/') {
        let stem = KNOWN_EXTENSIONS
            .iter()
            .find_map(|ext| last.strip_suffix(ext))
            .unwrap_or(last);
        if stem == BARREL_STEM {
            return if folder.is_empty() { ".".to_string() } else { folder.to_string() };
        }
    }

    if trimmed.is_empty() {
        ".".to_string()
    } else {
        trimmed.to_string()
    }
}
