//! Build-time host adapter.
//!
//! [`transform_program`] computes a barrel for every folder of the program
//! that lacks an `index.ts`, then hands back decorated versions of the
//! program and of the compiler host. The host decorator serves the barrels
//! as if they were on disk and rewrites barrel imports out of every emitted
//! file; the program decorator appends the extraction warnings to the
//! program's diagnostics.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::barrel::{calculate_barrel, BarrelFile, ExportedEntities};
use crate::diagnostic::{Diagnostic, DiagnosticCache};
use crate::directory::{barrel_path_for, folders_without_index_file};
use crate::error::Result;
use crate::fs::{normalize_path, FileSystem, MemoryFileSystem, NodeFileSystem};
use crate::options::{CompilerOptions, PluginConfig};
use crate::resolve::resolve_module_name;
use crate::rewriter::rewrite_imports;

// ═══════════════════════════════════════════════════════════════════════════════
// HOST CONTRACTS
// ═══════════════════════════════════════════════════════════════════════════════

/// File access of the compiler plus the emit-time writer.
pub trait CompilerHost: FileSystem {
    /// Writes an emitted file. `source_files` are the sources it was emitted
    /// from, the first being the file itself.
    fn write_output(&self, file_name: &Path, text: &str, _source_files: &[PathBuf]) -> Result<()> {
        self.write_file(file_name, text)
    }
}

impl CompilerHost for NodeFileSystem {}
impl CompilerHost for MemoryFileSystem {}

impl<T: CompilerHost + ?Sized> CompilerHost for &T {
    fn write_output(&self, file_name: &Path, text: &str, source_files: &[PathBuf]) -> Result<()> {
        (**self).write_output(file_name, text, source_files)
    }
}

pub trait Program {
    fn root_file_names(&self) -> Vec<PathBuf>;

    fn compiler_options(&self) -> &CompilerOptions;

    /// Diagnostics of one file, or of the whole program for `None`.
    fn semantic_diagnostics(&self, file: Option<&Path>) -> Vec<Diagnostic>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// BARREL GENERATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Barrels of one compilation keyed by their `<folder>/index.ts` path.
#[derive(Debug, Clone, Default)]
pub struct BarrelStore {
    barrels: BTreeMap<PathBuf, BarrelFile>,
}

impl BarrelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &Path, barrel: BarrelFile) {
        self.barrels.insert(normalize_path(path), barrel);
    }

    pub fn get(&self, path: &Path) -> Option<&BarrelFile> {
        self.barrels.get(&normalize_path(path))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.barrels.contains_key(&normalize_path(path))
    }

    pub fn barrel_entities(&self, path: &Path) -> Option<&ExportedEntities> {
        self.get(path).map(|barrel| &barrel.barrel_entities)
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.barrels.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.barrels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.barrels.is_empty()
    }
}

/// Calculates one barrel per folder and collects every warning.
pub fn generate_barrels_for_folders<F: FileSystem>(
    folders: &[PathBuf],
    options: &CompilerOptions,
    fs: &F,
) -> (BarrelStore, DiagnosticCache) {
    let mut store = BarrelStore::new();
    let mut diagnostics = DiagnosticCache::new();

    for folder in folders {
        let calculation = calculate_barrel(folder, options, fs);
        diagnostics.extend(calculation.diagnostics.clone());
        store.insert(&barrel_path_for(folder), calculation.into_barrel_file());
    }

    tracing::info!(barrels = store.len(), "generated barrels");
    (store, diagnostics)
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER HOST DECORATOR
// ═══════════════════════════════════════════════════════════════════════════════

pub struct BarrelCompilerHost<H> {
    inner: H,
    store: BarrelStore,
    options: CompilerOptions,
    config: PluginConfig,
}

impl<H: CompilerHost> BarrelCompilerHost<H> {
    pub fn new(inner: H, store: BarrelStore, options: CompilerOptions, config: PluginConfig) -> Self {
        Self {
            inner,
            store,
            options,
            config,
        }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    pub fn store(&self) -> &BarrelStore {
        &self.store
    }

    pub fn barrel_entities(&self, path: &Path) -> Option<&ExportedEntities> {
        self.store.barrel_entities(path)
    }

    /// `text` with barrel imports rewritten, or `None` when nothing changed.
    fn rewrite_output(&self, file_name: &Path, text: &str, source: &Path) -> Option<String> {
        let resolve = |specifier: &str| {
            resolve_module_name(specifier, source, &self.options, self)
                .and_then(|path| self.store.barrel_entities(&path))
        };

        match rewrite_imports(file_name, text, &self.options, resolve) {
            Ok(rewritten) if rewritten.has_rewritten_imports => {
                tracing::debug!(file = %file_name.display(), "rewrote barrel imports in output");
                Some(rewritten.code)
            }
            Ok(_) => None,
            Err(error) => {
                tracing::warn!(file = %file_name.display(), %error, "could not rewrite output, writing it unchanged");
                None
            }
        }
    }
}

impl<H: CompilerHost> FileSystem for BarrelCompilerHost<H> {
    fn file_exists(&self, path: &Path) -> bool {
        self.store.contains(path) || self.inner.file_exists(path)
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        match self.store.get(path) {
            Some(barrel) => Some(barrel.text.clone()),
            None => self.inner.read_file(path),
        }
    }

    fn directory_exists(&self, path: &Path) -> bool {
        self.inner.directory_exists(path)
    }

    fn read_directory(&self, dir: &Path) -> Vec<PathBuf> {
        self.inner.read_directory(dir)
    }

    fn write_file(&self, path: &Path, text: &str) -> Result<()> {
        self.inner.write_file(path, text)
    }

    fn original_cased_path(&self, path: &Path) -> PathBuf {
        self.inner.original_cased_path(path)
    }
}

impl<H: CompilerHost> CompilerHost for BarrelCompilerHost<H> {
    fn write_output(&self, file_name: &Path, text: &str, source_files: &[PathBuf]) -> Result<()> {
        if !self.config.should_transform_imports {
            return self.inner.write_output(file_name, text, source_files);
        }

        let Some(source) = source_files.first() else {
            return self.inner.write_output(file_name, text, source_files);
        };

        if self.store.contains(source) {
            // Loader dependency arrays still name the folder, so it needs a real index.
            if self.options.emits_loader_dependencies() {
                tracing::debug!(file = %file_name.display(), "writing barrel for loader-based module output");
                return self.inner.write_output(file_name, text, source_files);
            }
            tracing::debug!(file = %file_name.display(), "skipped writing virtual barrel");
            return Ok(());
        }

        match self.rewrite_output(file_name, text, source) {
            Some(rewritten) => self.inner.write_output(file_name, &rewritten, source_files),
            None => self.inner.write_output(file_name, text, source_files),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROGRAM DECORATOR
// ═══════════════════════════════════════════════════════════════════════════════

pub struct BarrelProgram<P> {
    inner: P,
    barrel_files: Vec<PathBuf>,
    diagnostics: DiagnosticCache,
}

impl<P: Program> BarrelProgram<P> {
    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn barrel_files(&self) -> &[PathBuf] {
        &self.barrel_files
    }

    pub fn diagnostic_cache(&self) -> &DiagnosticCache {
        &self.diagnostics
    }
}

impl<P: Program> Program for BarrelProgram<P> {
    fn root_file_names(&self) -> Vec<PathBuf> {
        let mut names = self.inner.root_file_names();
        for barrel in &self.barrel_files {
            if !names.contains(barrel) {
                names.push(barrel.clone());
            }
        }
        names
    }

    fn compiler_options(&self) -> &CompilerOptions {
        self.inner.compiler_options()
    }

    fn semantic_diagnostics(&self, file: Option<&Path>) -> Vec<Diagnostic> {
        let host = self.inner.semantic_diagnostics(file);
        self.diagnostics.merge_into(host, file)
    }
}

/// Program transform entry point.
pub fn transform_program<P: Program, H: CompilerHost>(
    program: P,
    host: H,
    config: PluginConfig,
) -> (BarrelProgram<P>, BarrelCompilerHost<H>) {
    let options = program.compiler_options().clone();
    let folders = folders_without_index_file(&program.root_file_names());
    let (store, diagnostics) = generate_barrels_for_folders(&folders, &options, &host);

    let program = BarrelProgram {
        inner: program,
        barrel_files: store.paths(),
        diagnostics,
    };
    let host = BarrelCompilerHost::new(host, store, options, config);
    (program, host)
}
