//! Relative module resolution, enough to tell whether an import names a
//! barrel. Bare specifiers (packages) never resolve to a barrel.

use std::path::{Path, PathBuf};

use crate::extensions::{extension_of, BARREL_STEM};
use crate::fs::{normalize_path, FileSystem};
use crate::options::CompilerOptions;

const TS_CANDIDATES: &[&str] = &[".ts", ".tsx", ".d.ts"];
const JS_CANDIDATES: &[&str] = &[".js", ".jsx"];

pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

fn candidate_extensions(options: &CompilerOptions) -> Vec<&'static str> {
    let mut extensions = TS_CANDIDATES.to_vec();
    if options.allow_js {
        extensions.extend_from_slice(JS_CANDIDATES);
    }
    extensions
}

/// Sources an emitted extension may have been compiled from.
fn source_extensions_for(extension: &str) -> &'static [&'static str] {
    match extension {
        ".js" => &[".ts", ".tsx", ".d.ts"],
        ".jsx" => &[".tsx"],
        ".mjs" => &[".mts", ".d.mts"],
        ".cjs" => &[".cts", ".d.cts"],
        _ => &[],
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

fn resolve_file<F: FileSystem>(base: &Path, options: &CompilerOptions, fs: &F) -> Option<PathBuf> {
    if let Some(extension) = extension_of(base) {
        let name = base.to_string_lossy();
        let stem = &name[..name.len() - extension.len()];
        for source in source_extensions_for(extension) {
            let candidate = PathBuf::from(format!("{}{}", stem, source));
            if fs.file_exists(&candidate) {
                return Some(candidate);
            }
        }
        if fs.file_exists(base) {
            return Some(base.to_path_buf());
        }
    }

    candidate_extensions(options)
        .into_iter()
        .map(|ext| with_suffix(base, ext))
        .find(|candidate| fs.file_exists(candidate))
}

/// Resolves `specifier` imported from `containing_file` to a file path.
pub fn resolve_module_name<F: FileSystem>(
    specifier: &str,
    containing_file: &Path,
    options: &CompilerOptions,
    fs: &F,
) -> Option<PathBuf> {
    if !is_relative_specifier(specifier) {
        return None;
    }

    let dir = containing_file.parent().unwrap_or_else(|| Path::new(""));
    let base = normalize_path(&dir.join(specifier));

    if let Some(file) = resolve_file(&base, options, fs) {
        return Some(file);
    }

    resolve_file(&base.join(BARREL_STEM), options, fs)
}
