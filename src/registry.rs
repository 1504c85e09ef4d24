//! Barrel Registry
//!
//! Live cache of the virtual barrels of an editing session. Each barrel goes
//! through `registered -> hydrated -> (stale -> hydrated)* -> deleted`. An
//! entry remembers the version of every file it was computed from, so a
//! graph update only recomputes barrels whose folder really changed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::barrel::{BarrelCalculation, ExportedEntities};
use crate::directory::barrel_path_for;
use crate::fs::normalize_path;
use crate::syntax::EMPTY_MODULE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrelState {
    /// Known to be virtual, content not computed yet.
    Registered,
    Hydrated,
}

#[derive(Debug, Clone)]
pub struct BarrelEntry {
    pub state: BarrelState,
    /// Version of every file the barrel was computed from.
    pub files: BTreeMap<PathBuf, String>,
    pub barrel_entities: ExportedEntities,
    pub text: String,
}

impl BarrelEntry {
    fn registered() -> Self {
        Self {
            state: BarrelState::Registered,
            files: BTreeMap::new(),
            barrel_entities: ExportedEntities::new(),
            text: EMPTY_MODULE.to_string(),
        }
    }
}

/// Why a barrel needs recomputing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    NotHydrated,
    FileListChanged,
    VersionChanged(PathBuf),
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        !matches!(self, Staleness::Fresh)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BarrelRegistry {
    barrels: BTreeMap<PathBuf, BarrelEntry>,
}

impl BarrelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with one empty barrel per folder.
    pub fn with_project_folders(folders: &[PathBuf]) -> Self {
        let mut registry = Self::new();
        for folder in folders {
            registry.register(&barrel_path_for(folder));
        }
        registry
    }

    pub fn is_virtual(&self, path: &Path) -> bool {
        self.barrels.contains_key(&normalize_path(path))
    }

    /// Registers an empty barrel. Returns false when one already exists.
    pub fn register(&mut self, path: &Path) -> bool {
        let path = normalize_path(path);
        if self.barrels.contains_key(&path) {
            return false;
        }
        tracing::info!(barrel = %path.display(), "registered virtual barrel");
        self.barrels.insert(path, BarrelEntry::registered());
        true
    }

    /// Replaces the entry with a fresh calculation.
    pub fn upsert(
        &mut self,
        path: &Path,
        calculation: &BarrelCalculation,
        version: impl Fn(&Path) -> String,
    ) {
        let path = normalize_path(path);
        let files = calculation
            .included_files
            .iter()
            .map(|file| (file.clone(), version(file)))
            .collect();

        tracing::debug!(
            barrel = %path.display(),
            entities = calculation.barrel_entities.len(),
            "hydrated virtual barrel"
        );
        self.barrels.insert(
            path,
            BarrelEntry {
                state: BarrelState::Hydrated,
                files,
                barrel_entities: calculation.barrel_entities.clone(),
                text: calculation.text.clone(),
            },
        );
    }

    pub fn delete(&mut self, path: &Path) -> Option<BarrelEntry> {
        let path = normalize_path(path);
        let removed = self.barrels.remove(&path);
        if removed.is_some() {
            tracing::info!(barrel = %path.display(), "deleted virtual barrel");
        }
        removed
    }

    pub fn get(&self, path: &Path) -> Option<&BarrelEntry> {
        self.barrels.get(&normalize_path(path))
    }

    pub fn barrel_entities(&self, path: &Path) -> Option<&ExportedEntities> {
        self.get(path).map(|entry| &entry.barrel_entities)
    }

    /// Served content: the hydrated text, or an empty module before that.
    pub fn text(&self, path: &Path) -> Option<&str> {
        self.get(path).map(|entry| entry.text.as_str())
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

    /// Compares the entry against the folder's current listing and versions.
    pub fn staleness(
        &self,
        path: &Path,
        current_files: &[PathBuf],
        version: impl Fn(&Path) -> String,
    ) -> Staleness {
        let Some(entry) = self.get(path) else {
            return Staleness::NotHydrated;
        };
        if entry.state == BarrelState::Registered {
            return Staleness::NotHydrated;
        }

        let mut current: Vec<&PathBuf> = current_files.iter().collect();
        current.sort();
        current.dedup();
        if !current.iter().copied().eq(entry.files.keys()) {
            return Staleness::FileListChanged;
        }

        for (file, recorded) in &entry.files {
            if version(file) != *recorded {
                return Staleness::VersionChanged(file.clone());
            }
        }

        Staleness::Fresh
    }
}
