use std::path::Path;

use crate::options::{CompilerOptions, JsxEmit};

/// Known extensions, longest first so `.d.ts` wins over `.ts`.
pub const KNOWN_EXTENSIONS: &[&str] = &[
    ".d.mts", ".d.cts", ".d.ts", ".json", ".tsx", ".mts", ".cts", ".jsx", ".mjs", ".cjs", ".ts",
    ".js",
];

const TS_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts", ".cts", ".d.cts", ".mts", ".d.mts"];
const JS_EXTENSIONS: &[&str] = &[".js", ".jsx", ".cjs", ".mjs"];

pub const JSON_EXTENSION: &str = ".json";

/// Stem of the aggregator file synthesized for a folder.
pub const BARREL_STEM: &str = "index";
pub const BARREL_FILE_NAME: &str = "index.ts";

/// Extensions a folder listing is restricted to under `options`.
pub fn supported_extensions(options: &CompilerOptions) -> Vec<&'static str> {
    let mut extensions = TS_EXTENSIONS.to_vec();
    if options.allow_js {
        extensions.extend_from_slice(JS_EXTENSIONS);
    }
    if options.resolve_json_module {
        extensions.push(JSON_EXTENSION);
    }
    extensions
}

/// The known extension `path` ends with, if any.
pub fn extension_of(path: &Path) -> Option<&'static str> {
    let name = path.file_name()?.to_str()?;
    KNOWN_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| name.len() > ext.len() && name.ends_with(ext))
}

pub fn is_ts_extension(extension: &str) -> bool {
    TS_EXTENSIONS.contains(&extension)
}

/// Extensions the host parses as code. Everything else is an external asset.
pub fn is_code_extension(extension: &str) -> bool {
    is_ts_extension(extension) || JS_EXTENSIONS.contains(&extension)
}

/// File name without directory and without its known extension.
pub fn file_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    match extension_of(path) {
        Some(ext) => name[..name.len() - ext.len()].to_string(),
        None => name,
    }
}

/// Whether `path` is an aggregator file for its folder.
pub fn is_barrel_file(path: &Path) -> bool {
    extension_of(path).map(is_code_extension).unwrap_or(false) && file_stem(path) == BARREL_STEM
}

/// Extension the host gives the emitted counterpart of a source file.
pub fn output_extension(extension: &str, options: &CompilerOptions) -> &'static str {
    match extension {
        ".json" => ".json",
        ".mts" | ".d.mts" | ".mjs" => ".mjs",
        ".cts" | ".d.cts" | ".cjs" => ".cjs",
        ".tsx" | ".jsx" if options.jsx == JsxEmit::Preserve => ".jsx",
        _ => ".js",
    }
}
