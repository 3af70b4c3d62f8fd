//! File descriptors handed from the content analyzer to the upload queue.

use crate::hash::ContentHash;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A pending upload as produced by the content analyzer.
///
/// `name` carries the display suffix appended to the content hash to form
/// the repository filename:
/// - empty when nothing could be derived from the source,
/// - an extension suffix such as `.png` sniffed from the content type,
/// - `-basename` when the caller supplied a name hint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Content hash, the deduplication key.
    pub hash: ContentHash,
    /// Display name suffix, possibly empty.
    pub name: String,
    /// Byte length of the fetched content.
    pub size: u64,
    /// Where the fetched bytes were staged, awaiting publish.
    pub temp_path: PathBuf,
}

impl FileDescriptor {
    /// The content-addressed filename inside the repository working tree.
    ///
    /// Collision-free by construction: the hash is the dedup key, so two
    /// distinct live files never share a filename.
    pub fn filename(&self) -> String {
        format!("{}{}", self.hash.to_hex(), self.name)
    }
}

/// Normalize a caller-supplied name hint into a filename suffix.
///
/// Takes the basename of the hint and prefixes it with `-` unless the hint
/// is already a bare extension (starts with a dot).
pub fn name_from_hint(hint: &str) -> String {
    let base = hint
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(hint)
        .trim();
    if base.is_empty() {
        return String::new();
    }
    if base.starts_with('.') {
        base.to_string()
    } else {
        format!("-{base}")
    }
}
