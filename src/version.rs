use sha2::{Digest, Sha256};
use std::path::Path;

use crate::fs::FileSystem;

/// Version recorded for a file that cannot be read.
pub const MISSING_VERSION: &str = "missing";

pub fn compute_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Version of `path`: the project's own script version when it tracks the
/// file, otherwise a hash of the file content.
pub fn file_version<F: FileSystem>(path: &Path, script_version: Option<String>, fs: &F) -> String {
    script_version.unwrap_or_else(|| {
        fs.read_file(path)
            .map(|source| format!("sha256:{}", compute_hash(&source)))
            .unwrap_or_else(|| MISSING_VERSION.to_string())
    })
}
