//! Core data types for the external content store.
//!
//! These mirror what a hosted repository exposes per file: a path, bytes,
//! and an opaque revision used for optimistic-concurrency writes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CloakError, Result};

/// Opaque revision marker returned by the store.
///
/// Callers never interpret it; they hand back the last one they observed
/// when updating a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content-addressed revision (BLAKE3 of the bytes), used by the local backends.
pub fn content_revision(content: &[u8]) -> Revision {
    Revision(blake3::hash(content).to_hex().to_string())
}

/// A file as read from the store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: String,
    pub content: Vec<u8>,
    pub revision: Revision,
}

/// Whether a listing entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Last path component
    pub name: String,

    /// Full path relative to the scope root
    pub path: String,

    pub kind: EntryKind,

    /// File revision; the local backends track none for directories
    pub revision: Option<Revision>,
}

impl FileEntry {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Whether opening this entry requires a passphrase.
    pub fn is_encrypted(&self) -> bool {
        self.kind == EntryKind::File && crate::session::is_encrypted_path(&self.path)
    }

    /// Whether this entry is the scope's verification artifact.
    pub fn is_artifact(&self) -> bool {
        self.kind == EntryKind::File && self.path == crate::artifact::ARTIFACT_PATH
    }
}

/// Normalize a file path relative to the scope root.
///
/// Leading slashes and surrounding whitespace are dropped. Empty paths and
/// paths with empty, `.` or `..` components are rejected.
pub fn normalize_path(path: &str) -> Result<String> {
    let normalized = normalize_dir(path)?;
    if normalized.is_empty() {
        return Err(CloakError::InvalidInput(
            "File path cannot be empty".to_string(),
        ));
    }
    Ok(normalized)
}

/// Normalize a directory path; the empty string names the scope root.
pub fn normalize_dir(path: &str) -> Result<String> {
    let trimmed = path.trim().trim_start_matches('/').trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if trimmed.contains('\\') {
        return Err(CloakError::InvalidInput(format!(
            "Path cannot contain backslashes: {}",
            path
        )));
    }
    for component in trimmed.split('/') {
        if component.is_empty() || component == "." || component == ".." {
            return Err(CloakError::InvalidInput(format!(
                "Invalid path component in {}",
                path
            )));
        }
    }
    Ok(trimmed.to_string())
}

/// Apply the store's write rule: no revision creates, a revision updates
/// only when it matches the current one.
pub(crate) fn check_revision(
    path: &str,
    current: Option<&Revision>,
    expected: Option<&Revision>,
) -> Result<()> {
    match (current, expected) {
        (None, None) => Ok(()),
        (Some(current), Some(expected)) if current == expected => Ok(()),
        _ => Err(CloakError::RevisionConflict(path.to_string())),
    }
}

/// Order entries directories-first, then by name.
pub fn sort_entries(entries: &mut [FileEntry]) {
    entries.sort_by(|a, b| {
        b.is_directory()
            .cmp(&a.is_directory())
            .then_with(|| a.name.cmp(&b.name))
    });
}
