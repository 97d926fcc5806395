//! In-memory content store.
//!
//! Behaves like a hosted repository with content-addressed revisions; used
//! in tests and for throwaway sessions.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::traits::ContentStore;
use super::types::{
    check_revision, content_revision, normalize_dir, normalize_path, EntryKind, FileEntry,
    Revision, StoredFile,
};
use crate::error::{CloakError, Result};
use crate::scope::Scope;

/// A successful write as recorded by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub scope: Scope,
    pub path: String,
    pub message: String,
}

type ScopeFiles = BTreeMap<String, Vec<u8>>;

#[derive(Default)]
pub struct MemoryStore {
    files: RwLock<HashMap<Scope, ScopeFiles>>,
    commits: RwLock<Vec<Commit>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every successful write, oldest first.
    pub fn commits(&self) -> Vec<Commit> {
        self.commits
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Whether `path` exists in `scope`.
    pub fn contains(&self, scope: &Scope, path: &str) -> bool {
        self.files_read()
            .get(scope)
            .is_some_and(|files| files.contains_key(path))
    }

    fn files_read(&self) -> RwLockReadGuard<'_, HashMap<Scope, ScopeFiles>> {
        self.files.read().unwrap_or_else(|e| e.into_inner())
    }

    fn files_write(&self) -> RwLockWriteGuard<'_, HashMap<Scope, ScopeFiles>> {
        self.files.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn read(&self, scope: &Scope, path: &str) -> Result<StoredFile> {
        let path = normalize_path(path)?;
        let files = self.files_read();
        let content = files
            .get(scope)
            .and_then(|files| files.get(&path))
            .ok_or_else(|| CloakError::NotFound(path.clone()))?;
        Ok(StoredFile {
            revision: content_revision(content),
            content: content.clone(),
            path,
        })
    }

    async fn write(
        &self,
        scope: &Scope,
        path: &str,
        content: Vec<u8>,
        revision: Option<&Revision>,
        message: &str,
    ) -> Result<Revision> {
        let path = normalize_path(path)?;
        let new_revision = content_revision(&content);
        {
            let mut files = self.files_write();
            let scope_files = files.entry(scope.clone()).or_default();
            let current = scope_files.get(&path).map(|bytes| content_revision(bytes));
            check_revision(&path, current.as_ref(), revision)?;
            scope_files.insert(path.clone(), content);
        }
        self.commits
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Commit {
                scope: scope.clone(),
                path,
                message: message.to_string(),
            });
        Ok(new_revision)
    }

    async fn list(&self, scope: &Scope, path: &str) -> Result<Vec<FileEntry>> {
        let dir = normalize_dir(path)?;
        let files = self.files_read();
        let Some(scope_files) = files.get(scope) else {
            return if dir.is_empty() {
                Ok(Vec::new())
            } else {
                Err(CloakError::NotFound(dir))
            };
        };

        // Listing a file path yields that single file.
        if let Some(content) = scope_files.get(&dir) {
            let name = dir.rsplit('/').next().unwrap_or(&dir).to_string();
            return Ok(vec![FileEntry {
                name,
                path: dir.clone(),
                kind: EntryKind::File,
                revision: Some(content_revision(content)),
            }]);
        }

        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };
        let mut entries = Vec::new();
        let mut directories = BTreeSet::new();
        for (file_path, content) in scope_files.range(prefix.clone()..) {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                break;
            };
            match rest.split_once('/') {
                Some((child, _)) => {
                    directories.insert(child.to_string());
                }
                None => entries.push(FileEntry {
                    name: rest.to_string(),
                    path: file_path.clone(),
                    kind: EntryKind::File,
                    revision: Some(content_revision(content)),
                }),
            }
        }
        for name in directories {
            entries.push(FileEntry {
                path: format!("{}{}", prefix, name),
                name,
                kind: EntryKind::Directory,
                revision: None,
            });
        }

        if entries.is_empty() && !dir.is_empty() {
            return Err(CloakError::NotFound(dir));
        }
        Ok(entries)
    }
}
