//! Interactive session host adapter.
//!
//! An editing session never writes barrels to disk. The server host decorator
//! makes `index.ts` of every project folder without one appear to exist, the
//! registry tracks what those files contain, and the project update hook
//! recomputes the barrels whose folder changed after each graph update.
//! Reference and rename queries are filtered so the synthetic files never
//! show up in results.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::barrel::{calculate_barrel, ExportedEntities};
use crate::diagnostic::Diagnostic;
use crate::directory::{
    barrel_path_for, folders_without_index_file, get_directory_files, physical_aggregator_exists,
};
use crate::error::Result;
use crate::exports::exports_of_source;
use crate::extensions::{extension_of, BARREL_FILE_NAME};
use crate::fs::{normalize_path, FileSystem};
use crate::options::{CompilerOptions, ProjectConfig};
use crate::registry::{BarrelRegistry, Staleness};
use crate::resolve::resolve_module_name;
use crate::tasks::{DeferredQueue, SessionTask};
use crate::version::file_version;

// ═══════════════════════════════════════════════════════════════════════════════
// HOST CONTRACTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSpan {
    pub file_name: PathBuf,
    pub start: u32,
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencedSymbol {
    pub definition: DocumentSpan,
    pub references: Vec<DocumentSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModule {
    pub resolved_file_name: PathBuf,
    pub is_external_library_import: bool,
}

pub trait LanguageServiceHost {
    fn script_file_names(&self) -> Vec<PathBuf>;

    fn resolve_module_names(&self, module_names: &[String], containing_file: &Path)
        -> Vec<Option<ResolvedModule>>;
}

/// The project an editing session works on.
pub trait Project: LanguageServiceHost {
    fn root_file_names(&self) -> Vec<PathBuf>;

    fn compiler_options(&self) -> CompilerOptions;

    /// Version the project tracks for an open or watched file.
    fn script_version(&self, path: &Path) -> Option<String>;

    fn has_script_info(&self, path: &Path) -> bool;

    fn remove_file(&self, path: &Path);

    /// Replaces the whole content of a tracked file.
    fn edit_content(&self, path: &Path, text: &str);

    /// Host's own graph update. Returns whether the program changed.
    fn update_graph(&self) -> bool;
}

pub trait LanguageService {
    fn semantic_diagnostics(&self, file: &Path) -> Vec<Diagnostic>;

    fn find_references(&self, file: &Path, position: u32) -> Option<Vec<ReferencedSymbol>>;

    fn find_rename_locations(&self, file: &Path, position: u32) -> Option<Vec<DocumentSpan>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED STATE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct SessionState {
    registry: RefCell<BarrelRegistry>,
    tasks: RefCell<DeferredQueue<SessionTask>>,
    project_dirs: Vec<PathBuf>,
}

impl SessionState {
    fn is_project_path(&self, path: &Path) -> bool {
        let in_dependencies = path
            .components()
            .any(|component| component.as_os_str() == "node_modules");
        !in_dependencies && self.project_dirs.iter().any(|dir| path.starts_with(dir))
    }

    fn is_virtual(&self, path: &Path) -> bool {
        self.registry.borrow().is_virtual(path)
    }

    fn create_barrel(&self, path: &Path) {
        if self.registry.borrow_mut().register(path) {
            self.tasks.borrow_mut().schedule(SessionTask::UpdateGraph);
        }
    }

    fn delete_barrel(&self, path: &Path) {
        if self.registry.borrow_mut().delete(path).is_some() {
            let mut tasks = self.tasks.borrow_mut();
            tasks.schedule(SessionTask::RemoveFile(normalize_path(path)));
            tasks.schedule(SessionTask::UpdateGraph);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SERVER HOST DECORATOR
// ═══════════════════════════════════════════════════════════════════════════════

pub struct BarrelServerHost<H> {
    inner: H,
    state: Rc<SessionState>,
}

impl<H: FileSystem> BarrelServerHost<H> {
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: FileSystem> FileSystem for BarrelServerHost<H> {
    fn file_exists(&self, path: &Path) -> bool {
        let exists = self.inner.file_exists(path);
        let candidate = normalize_path(&self.inner.original_cased_path(path));

        // A physical file always wins over the synthetic one.
        if exists {
            if self.state.is_virtual(&candidate) {
                self.state.delete_barrel(&candidate);
            }
            return true;
        }

        if self.state.is_virtual(&candidate) {
            return true;
        }

        if !self.state.is_project_path(&candidate) {
            return false;
        }

        // A folder just created inside the project gets its barrel.
        if extension_of(&candidate).is_none() && self.inner.directory_exists(&candidate) {
            if !physical_aggregator_exists(&candidate, &self.inner) {
                self.state.create_barrel(&candidate.join(BARREL_FILE_NAME));
            }
            return false;
        }

        let is_index_lookup = candidate
            .file_name()
            .map(|name| name == BARREL_FILE_NAME)
            .unwrap_or(false);
        let folder_exists = candidate
            .parent()
            .map(|dir| {
                self.inner.directory_exists(dir) && !physical_aggregator_exists(dir, &self.inner)
            })
            .unwrap_or(false);

        if is_index_lookup && folder_exists {
            self.state.create_barrel(&candidate);
            return true;
        }

        false
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        if let Some(text) = self.inner.read_file(path) {
            return Some(text);
        }
        let candidate = self.inner.original_cased_path(path);
        self.state
            .registry
            .borrow()
            .text(&candidate)
            .map(str::to_string)
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

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Session plugin: wraps the project, its language service and the server
/// host, and exposes the decorated language service and host.
pub struct BarrelSession<P, S, H> {
    project: P,
    service: S,
    host: BarrelServerHost<H>,
    state: Rc<SessionState>,
}

impl<P: Project, S: LanguageService, H: FileSystem> BarrelSession<P, S, H> {
    /// Session entry point. Every folder of the project's root files without
    /// an `index.ts` starts out with a registered, not yet hydrated barrel.
    pub fn create(project: P, service: S, server_host: H, project_dirs: Vec<PathBuf>) -> Self {
        let folders = folders_without_index_file(&project.root_file_names());
        let state = Rc::new(SessionState {
            registry: RefCell::new(BarrelRegistry::with_project_folders(&folders)),
            tasks: RefCell::new(DeferredQueue::new()),
            project_dirs: project_dirs.iter().map(|dir| normalize_path(dir)).collect(),
        });

        tracing::info!(
            barrels = folders.len(),
            project_dirs = project_dirs.len(),
            "created barrel session"
        );

        let host = BarrelServerHost {
            inner: server_host,
            state: Rc::clone(&state),
        };

        Self {
            project,
            service,
            host,
            state,
        }
    }

    pub fn from_config(project: P, service: S, server_host: H, config: &ProjectConfig) -> Self {
        Self::create(project, service, server_host, config.project_dirs.clone())
    }

    pub fn project(&self) -> &P {
        &self.project
    }

    pub fn server_host(&self) -> &BarrelServerHost<H> {
        &self.host
    }

    pub fn is_virtual(&self, path: &Path) -> bool {
        self.state.is_virtual(path)
    }

    pub fn barrel_paths(&self) -> Vec<PathBuf> {
        self.state.registry.borrow().paths()
    }

    pub fn barrel_entities(&self, path: &Path) -> Option<ExportedEntities> {
        self.state.registry.borrow().barrel_entities(path).cloned()
    }

    pub fn barrel_text(&self, path: &Path) -> Option<String> {
        self.state.registry.borrow().text(path).map(str::to_string)
    }

    pub fn pending_tasks(&self) -> usize {
        self.state.tasks.borrow().len()
    }

    fn version_of(&self, file: &Path) -> String {
        file_version(file, self.project.script_version(file), &self.host)
    }

    /// The host's graph update followed by the barrel update hook.
    pub fn update_graph(&self) -> bool {
        let changed = self.project.update_graph();
        self.update_existing_barrels();
        changed
    }

    /// Drops barrels that lost their script info or folder, or whose folder
    /// gained an `index.*` file, and recomputes the stale ones.
    pub fn update_existing_barrels(&self) {
        let options = self.project.compiler_options();

        for barrel in self.barrel_paths() {
            if !self.project.has_script_info(&barrel) {
                self.state.registry.borrow_mut().delete(&barrel);
                continue;
            }

            let Some(folder) = barrel.parent() else {
                continue;
            };

            if !self.host.directory_exists(folder)
                || physical_aggregator_exists(folder, self.host.inner())
            {
                tracing::debug!(barrel = %barrel.display(), "folder gone or has its own index, dropping barrel");
                self.state.registry.borrow_mut().delete(&barrel);
                self.project.remove_file(&barrel);
                continue;
            }

            let files = get_directory_files(folder, &options, &self.host);
            let staleness = self
                .state
                .registry
                .borrow()
                .staleness(&barrel, &files, |file| self.version_of(file));
            if staleness == Staleness::Fresh {
                continue;
            }
            tracing::debug!(barrel = %barrel.display(), ?staleness, "recomputing stale barrel");

            let calculation = calculate_barrel(folder, &options, &self.host);
            // Versions may read through the host, which borrows the registry.
            let versions: BTreeMap<PathBuf, String> = calculation
                .included_files
                .iter()
                .map(|file| (file.clone(), self.version_of(file)))
                .collect();
            self.state.registry.borrow_mut().upsert(&barrel, &calculation, |file| {
                versions.get(file).cloned().unwrap_or_default()
            });
            self.project.edit_content(&barrel, &calculation.text);
        }
    }

    /// Runs the tasks queued so far. Tasks they queue wait for the next call.
    pub fn run_pending_tasks(&self) -> usize {
        let tasks = self.state.tasks.borrow_mut().drain();
        let count = tasks.len();

        for task in tasks {
            match task {
                SessionTask::RemoveFile(path) => {
                    if self.project.has_script_info(&path) {
                        self.project.remove_file(&path);
                    }
                }
                SessionTask::UpdateGraph => {
                    self.update_graph();
                }
            }
        }
        count
    }

    fn folder_barrel_is_virtual(&self, file: &Path) -> bool {
        file.parent()
            .map(|folder| self.is_virtual(&barrel_path_for(folder)))
            .unwrap_or(false)
    }
}

impl<P: Project, S: LanguageService, H: FileSystem> LanguageService for BarrelSession<P, S, H> {
    /// Host diagnostics plus the extraction warnings of files that feed a
    /// virtual barrel.
    fn semantic_diagnostics(&self, file: &Path) -> Vec<Diagnostic> {
        let mut diagnostics = self.service.semantic_diagnostics(file);

        if !self.folder_barrel_is_virtual(file) {
            return diagnostics;
        }

        let Some(source) = self.host.read_file(file) else {
            return diagnostics;
        };

        if let Some(result) = exports_of_source(file, &source) {
            diagnostics.extend(result.diagnostics);
        }
        diagnostics
    }

    /// References inside virtual barrels are dropped. A symbol defined in a
    /// virtual barrel is the re-export of the preceding one, so its
    /// references are merged into that group.
    fn find_references(&self, file: &Path, position: u32) -> Option<Vec<ReferencedSymbol>> {
        let symbols = self.service.find_references(file, position).unwrap_or_default();
        let mut filtered: Vec<ReferencedSymbol> = Vec::new();

        for symbol in symbols {
            let references = symbol
                .references
                .into_iter()
                .filter(|reference| !self.is_virtual(&reference.file_name));

            if !self.is_virtual(&symbol.definition.file_name) {
                filtered.push(ReferencedSymbol {
                    definition: symbol.definition,
                    references: references.collect(),
                });
                continue;
            }

            if let Some(previous) = filtered.last_mut() {
                previous.references.extend(references);
            }
        }

        Some(filtered)
    }

    fn find_rename_locations(&self, file: &Path, position: u32) -> Option<Vec<DocumentSpan>> {
        let locations = self.service.find_rename_locations(file, position)?;

        if !self.folder_barrel_is_virtual(file) {
            return Some(locations);
        }

        let references = self.find_references(file, position)?;
        Some(
            references
                .into_iter()
                .flat_map(|symbol| symbol.references)
                .collect(),
        )
    }
}

impl<P: Project, S: LanguageService, H: FileSystem> LanguageServiceHost for BarrelSession<P, S, H> {
    fn script_file_names(&self) -> Vec<PathBuf> {
        let mut seen = BTreeSet::new();
        self.project
            .script_file_names()
            .into_iter()
            .chain(self.barrel_paths())
            .filter(|path| seen.insert(path.clone()))
            .collect()
    }

    /// Names the host left unresolved are retried against the decorated
    /// server host, where virtual barrels exist.
    fn resolve_module_names(
        &self,
        module_names: &[String],
        containing_file: &Path,
    ) -> Vec<Option<ResolvedModule>> {
        let options = self.project.compiler_options();
        let resolved = self.project.resolve_module_names(module_names, containing_file);

        module_names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                if let Some(Some(resolution)) = resolved.get(index) {
                    return Some(resolution.clone());
                }
                resolve_module_name(name, containing_file, &options, &self.host).map(|path| {
                    ResolvedModule {
                        resolved_file_name: path,
                        is_external_library_import: false,
                    }
                })
            })
            .collect()
    }
}
