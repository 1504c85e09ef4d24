//! Compiler and plugin configuration.
//!
//! Mirrors the subset of a tsconfig `compilerOptions` block that changes how
//! barrels are printed and how rewritten imports are spelled.

use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{BarrelError, Result};

/// Name the plugin is registered under inside a tsconfig `plugins` array.
pub const PLUGIN_NAME: &str = "virtual-barrel";

// ═══════════════════════════════════════════════════════════════════════════════
// MODULE KINDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Ordered like the host's enum so range comparisons keep their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum ModuleKind {
    None,
    #[default]
    CommonJS,
    AMD,
    UMD,
    System,
    ES2015,
    ES2020,
    ES2022,
    ESNext,
    Node16,
    NodeNext,
    Preserve,
}

impl FromStr for ModuleKind {
    type Err = BarrelError;

    fn from_str(value: &str) -> Result<Self> {
        let kind = match value.to_ascii_lowercase().as_str() {
            "none" => Self::None,
            "commonjs" => Self::CommonJS,
            "amd" => Self::AMD,
            "umd" => Self::UMD,
            "system" => Self::System,
            "es6" | "es2015" => Self::ES2015,
            "es2020" => Self::ES2020,
            "es2022" => Self::ES2022,
            "esnext" => Self::ESNext,
            "node16" => Self::Node16,
            "nodenext" => Self::NodeNext,
            "preserve" => Self::Preserve,
            _ => {
                return Err(BarrelError::UnknownOption {
                    option: "module",
                    value: value.to_string(),
                })
            }
        };
        Ok(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum ModuleResolutionKind {
    Classic,
    #[default]
    Node10,
    Node16,
    NodeNext,
    Bundler,
}

impl FromStr for ModuleResolutionKind {
    type Err = BarrelError;

    fn from_str(value: &str) -> Result<Self> {
        let kind = match value.to_ascii_lowercase().as_str() {
            "classic" => Self::Classic,
            "node" | "node10" => Self::Node10,
            "node16" => Self::Node16,
            "nodenext" => Self::NodeNext,
            "bundler" => Self::Bundler,
            _ => {
                return Err(BarrelError::UnknownOption {
                    option: "moduleResolution",
                    value: value.to_string(),
                })
            }
        };
        Ok(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum JsxEmit {
    #[default]
    None,
    Preserve,
    React,
    ReactNative,
    ReactJsx,
    ReactJsxDev,
}

impl FromStr for JsxEmit {
    type Err = BarrelError;

    fn from_str(value: &str) -> Result<Self> {
        let kind = match value.to_ascii_lowercase().as_str() {
            "none" => Self::None,
            "preserve" => Self::Preserve,
            "react" => Self::React,
            "react-native" => Self::ReactNative,
            "react-jsx" => Self::ReactJsx,
            "react-jsxdev" => Self::ReactJsxDev,
            _ => {
                return Err(BarrelError::UnknownOption {
                    option: "jsx",
                    value: value.to_string(),
                })
            }
        };
        Ok(kind)
    }
}

macro_rules! deserialize_from_str {
    ($($ty:ty),*) => {
        $(
            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                    let value = String::deserialize(deserializer)?;
                    value.parse().map_err(serde::de::Error::custom)
                }
            }
        )*
    };
}

deserialize_from_str!(ModuleKind, ModuleResolutionKind, JsxEmit);

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    pub module: ModuleKind,
    pub module_resolution: ModuleResolutionKind,
    pub resolve_json_module: bool,
    pub allow_js: bool,
    pub jsx: JsxEmit,
}

impl CompilerOptions {
    pub fn is_es_module(&self) -> bool {
        self.module >= ModuleKind::ES2015
    }

    pub fn is_node_modern_resolution(&self) -> bool {
        matches!(
            self.module_resolution,
            ModuleResolutionKind::Node16 | ModuleResolutionKind::NodeNext
        )
    }

    /// Whether non-code assets need an `assert { type: ... }` clause.
    pub fn supports_import_attributes(&self) -> bool {
        self.module == ModuleKind::ESNext
    }

    /// Module kinds whose output names dependencies in a loader call
    /// (`define([...])`, `System.register([...])`) instead of `import` or
    /// `require`.
    pub fn emits_loader_dependencies(&self) -> bool {
        matches!(
            self.module,
            ModuleKind::AMD | ModuleKind::UMD | ModuleKind::System
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLUGIN CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginConfig {
    /// When false, synthetic barrels are emitted as physical files and imports stay untouched.
    pub should_transform_imports: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            should_transform_imports: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PluginEntry {
    #[serde(default)]
    transform: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(flatten)]
    config: PluginConfig,
}

impl PluginEntry {
    fn is_this_plugin(&self) -> bool {
        [&self.transform, &self.name]
            .into_iter()
            .flatten()
            .any(|n| n.contains(PLUGIN_NAME))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProjectConfig {
    #[serde(default)]
    compiler_options: RawCompilerOptions,
    #[serde(default)]
    include: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    #[serde(flatten)]
    options: CompilerOptions,
    #[serde(default)]
    plugins: Vec<PluginEntry>,
}

/// A loaded tsconfig-style project file.
#[derive(Debug, Clone, Default)]
pub struct ProjectConfig {
    pub root_dir: PathBuf,
    pub compiler_options: CompilerOptions,
    pub plugin: PluginConfig,
    /// Directories barrels may be synthesized in, absolute.
    pub project_dirs: Vec<PathBuf>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let root_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::parse(&text, root_dir)
    }

    pub fn parse(text: &str, root_dir: PathBuf) -> Result<Self> {
        let raw: RawProjectConfig = serde_json::from_str(text)?;

        let plugin = raw
            .compiler_options
            .plugins
            .iter()
            .find(|p| p.is_this_plugin())
            .map(|p| p.config.clone())
            .unwrap_or_default();

        // No `include` means the host's default of everything under the config.
        let project_dirs = if raw.include.is_empty() {
            vec![root_dir.clone()]
        } else {
            raw.include
                .iter()
                .map(|pattern| root_dir.join(wildcard_directory(pattern)))
                .collect()
        };

        Ok(Self {
            compiler_options: raw.compiler_options.options,
            plugin,
            project_dirs,
            root_dir,
        })
    }
}

/// The literal directory prefix of an include pattern (`src/**/*` -> `src`).
fn wildcard_directory(pattern: &str) -> PathBuf {
    let literal: Vec<&str> = pattern
        .split('/')
        .take_while(|segment| !segment.contains('*') && !segment.contains('?'))
        .collect();

    let last_is_file = literal
        .last()
        .map(|s| s.contains('.') && *s != "." && *s != "..")
        .unwrap_or(false);

    let dir_segments = if last_is_file && literal.len() == pattern.split('/').count() {
        &literal[..literal.len() - 1]
    } else {
        &literal[..]
    };

    dir_segments.iter().collect()
}
