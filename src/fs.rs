//! File system capability used by every host adapter.
//!
//! Host adapters never mutate the wrapped host: they hold an implementation of
//! [`FileSystem`] and answer some calls themselves before delegating.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

pub trait FileSystem {
    fn file_exists(&self, path: &Path) -> bool;

    fn read_file(&self, path: &Path) -> Option<String>;

    fn directory_exists(&self, path: &Path) -> bool;

    /// Immediate file children of `dir`, sorted by path.
    fn read_directory(&self, dir: &Path) -> Vec<PathBuf>;

    fn write_file(&self, path: &Path, text: &str) -> Result<()>;

    /// Recovers the on-disk casing of a path the host may have lower-cased.
    /// Case handling is platform specific, so the default is the identity.
    fn original_cased_path(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn file_exists(&self, path: &Path) -> bool {
        (**self).file_exists(path)
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        (**self).read_file(path)
    }

    fn directory_exists(&self, path: &Path) -> bool {
        (**self).directory_exists(path)
    }

    fn read_directory(&self, dir: &Path) -> Vec<PathBuf> {
        (**self).read_directory(dir)
    }

    fn write_file(&self, path: &Path, text: &str) -> Result<()> {
        (**self).write_file(path, text)
    }

    fn original_cased_path(&self, path: &Path) -> PathBuf {
        (**self).original_cased_path(path)
    }
}

/// Lexically normalizes a path: drops `.` and folds `..` into its parent.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

// ═══════════════════════════════════════════════════════════════════════════════
// DISK
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeFileSystem;

impl FileSystem for NodeFileSystem {
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        fs::read_to_string(path).ok()
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_directory(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();
        files.sort();
        files
    }

    fn write_file(&self, path: &Path, text: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IN MEMORY
// ═══════════════════════════════════════════════════════════════════════════════

/// File system held in memory. Directories exist implicitly as ancestors of
/// files, or explicitly through [`MemoryFileSystem::create_dir`].
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RefCell<BTreeMap<PathBuf, String>>,
    dirs: RefCell<Vec<PathBuf>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<P: AsRef<Path>, S: Into<String>>(files: impl IntoIterator<Item = (P, S)>) -> Self {
        let fs = Self::new();
        for (path, text) in files {
            fs.insert(path, text);
        }
        fs
    }

    pub fn insert<P: AsRef<Path>, S: Into<String>>(&self, path: P, text: S) {
        self.files
            .borrow_mut()
            .insert(normalize_path(path.as_ref()), text.into());
    }

    pub fn remove(&self, path: &Path) -> Option<String> {
        self.files.borrow_mut().remove(&normalize_path(path))
    }

    /// Removes a directory and everything below it.
    pub fn remove_dir(&self, dir: &Path) {
        let dir = normalize_path(dir);
        self.files.borrow_mut().retain(|path, _| !path.starts_with(&dir));
        self.dirs.borrow_mut().retain(|path| !path.starts_with(&dir));
    }

    pub fn create_dir(&self, dir: &Path) {
        self.dirs.borrow_mut().push(normalize_path(dir));
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl FileSystem for MemoryFileSystem {
    fn file_exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(&normalize_path(path))
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(&normalize_path(path)).cloned()
    }

    fn directory_exists(&self, path: &Path) -> bool {
        let path = normalize_path(path);
        self.dirs.borrow().iter().any(|d| d.starts_with(&path))
            || self
                .files
                .borrow()
                .keys()
                .any(|file| file.starts_with(&path) && *file != path)
    }

    fn read_directory(&self, dir: &Path) -> Vec<PathBuf> {
        let dir = normalize_path(dir);
        self.files
            .borrow()
            .keys()
            .filter(|file| file.parent() == Some(dir.as_path()))
            .cloned()
            .collect()
    }

    fn write_file(&self, path: &Path, text: &str) -> Result<()> {
        self.insert(path, text);
        Ok(())
    }
}
