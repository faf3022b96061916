//! OutputFile type for sprite sheets written to disk.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// A sprite sheet persisted by a completed pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    /// Where the image was written.
    pub path: PathBuf,

    /// Number of bytes written.
    pub bytes_written: u64,

    /// Content hash of the written bytes (`sha256:<hex>`).
    pub content_hash: String,
}

impl OutputFile {
    /// Describes `bytes` as written to `path`.
    pub fn new(path: &Path, bytes: &[u8]) -> Self {
        Self {
            path: path.to_path_buf(),
            bytes_written: bytes.len() as u64,
            content_hash: compute_content_hash(bytes),
        }
    }
}

/// Computes a `sha256:`-prefixed hex digest of `bytes`.
///
/// Identical image bytes always produce the same hash, which makes
/// reruns against a deterministic backend easy to compare.
pub fn compute_content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}
