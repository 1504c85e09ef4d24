use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::extensions::{extension_of, is_barrel_file, supported_extensions, BARREL_FILE_NAME};
use crate::fs::{normalize_path, FileSystem};
use crate::options::CompilerOptions;

/// Files contributing to the barrel of `dir`: immediate children with a
/// supported extension, aggregator files excluded, sorted by path.
pub fn get_directory_files<F: FileSystem>(
    dir: &Path,
    options: &CompilerOptions,
    fs: &F,
) -> Vec<PathBuf> {
    let extensions = supported_extensions(options);
    let dir = normalize_path(dir);

    let mut files: Vec<PathBuf> = fs
        .read_directory(&dir)
        .into_iter()
        .map(|path| normalize_path(&path))
        .filter(|path| path.parent() == Some(dir.as_path()))
        .filter(|path| {
            extension_of(path)
                .map(|ext| extensions.contains(&ext))
                .unwrap_or(false)
        })
        .filter(|path| !is_barrel_file(path))
        .collect();

    files.sort();
    files
}

/// Folders holding at least one root file but no `index.*` code file among
/// them, in order of first appearance.
pub fn folders_without_index_file(root_file_names: &[PathBuf]) -> Vec<PathBuf> {
    let aggregated: HashSet<PathBuf> = root_file_names
        .iter()
        .filter(|p| is_barrel_file(p))
        .filter_map(|p| p.parent().map(normalize_path))
        .collect();
    let mut seen = HashSet::new();
    let mut folders = Vec::new();

    for file in root_file_names {
        let Some(folder) = file.parent().map(normalize_path) else {
            continue;
        };
        if aggregated.contains(&folder) {
            continue;
        }
        if seen.insert(folder.clone()) {
            folders.push(folder);
        }
    }

    folders
}

/// Whether `folder` already holds an `index.*` code file on disk. Such a
/// file would be shadowed by, or resolve back to, a synthesized `index.ts`.
pub fn physical_aggregator_exists<F: FileSystem>(folder: &Path, fs: &F) -> bool {
    fs.read_directory(folder).iter().any(|path| is_barrel_file(path))
}

/// Path of the aggregator synthesized for `folder`.
pub fn barrel_path_for(folder: &Path) -> PathBuf {
    normalize_path(&folder.join(BARREL_FILE_NAME))
}
