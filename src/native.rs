use napi_derive::napi;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::barrel::{calculate_barrel, BarrelFile, ExportedEntities};
use crate::compiler::{BarrelCompilerHost, BarrelStore};
use crate::diagnostic::Diagnostic;
use crate::fs::NodeFileSystem;
use crate::options::{CompilerOptions, PluginConfig};
use crate::resolve::resolve_module_name;
use crate::rewriter::rewrite_imports;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BarrelOutput {
    text: String,
    included_files: Vec<String>,
    barrel_entities: ExportedEntities,
    diagnostics: Vec<Diagnostic>,
}

fn parse_options(options_json: Option<String>) -> napi::Result<CompilerOptions> {
    match options_json {
        Some(json) => {
            serde_json::from_str(&json).map_err(|e| napi::Error::from_reason(e.to_string()))
        }
        None => Ok(CompilerOptions::default()),
    }
}

#[napi]
pub fn calculate_barrel_native(
    dir: String,
    options_json: Option<String>,
) -> napi::Result<serde_json::Value> {
    let options = parse_options(options_json)?;
    let calculation = calculate_barrel(Path::new(&dir), &options, &NodeFileSystem);

    let output = BarrelOutput {
        text: calculation.text,
        included_files: calculation
            .included_files
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        barrel_entities: calculation.barrel_entities,
        diagnostics: calculation.diagnostics.into_values().flatten().collect(),
    };
    serde_json::to_value(output).map_err(|e| napi::Error::from_reason(e.to_string()))
}

/// `barrels_json` maps barrel paths (`<folder>/index.ts`) to their manifests.
#[napi]
pub fn rewrite_imports_native(
    file_name: String,
    code: String,
    barrels_json: String,
    options_json: Option<String>,
) -> napi::Result<serde_json::Value> {
    let options = parse_options(options_json)?;
    let barrels: BTreeMap<PathBuf, ExportedEntities> =
        serde_json::from_str(&barrels_json).map_err(|e| napi::Error::from_reason(e.to_string()))?;

    let mut store = BarrelStore::new();
    for (path, barrel_entities) in barrels {
        let barrel = BarrelFile {
            statements: Vec::new(),
            text: String::new(),
            barrel_entities,
        };
        store.insert(&path, barrel);
    }
    let host = BarrelCompilerHost::new(NodeFileSystem, store, options.clone(), PluginConfig::default());

    let file = PathBuf::from(&file_name);
    let resolve = |specifier: &str| {
        resolve_module_name(specifier, &file, &options, &host)
            .and_then(|path| host.barrel_entities(&path))
    };
    let rewritten = rewrite_imports(&file, &code, &options, resolve)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;

    Ok(serde_json::json!({
        "code": rewritten.code,
        "hasRewrittenImports": rewritten.has_rewritten_imports,
    }))
}
