//! Local-directory content store.
//!
//! Lays repositories out as `<root>/<owner>/<repository>/<path>` and uses the
//! BLAKE3 hash of each file as its revision. Blocking filesystem work runs on
//! tokio's blocking pool.
//!
//! The revision check and the rename are not one atomic step; two processes
//! writing the same file at the same instant can both pass the check. That is
//! within the single-writer-per-scope model the session assumes.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::traits::ContentStore;
use super::types::{
    check_revision, content_revision, normalize_dir, normalize_path, EntryKind, FileEntry,
    Revision, StoredFile,
};
use crate::error::{CloakError, Result};
use crate::fs::{write_atomic, TEMP_MARKER};
use crate::scope::Scope;

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding `scope`'s files, two levels below the root.
    ///
    /// # Errors
    ///
    /// Returns `CloakError::InvalidInput` if a scope component is not a
    /// plain path segment on this platform.
    pub fn scope_dir(&self, scope: &Scope) -> Result<PathBuf> {
        for segment in [scope.owner(), scope.repository()] {
            let mut components = Path::new(segment).components();
            let plain = matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(name)), None) if name == segment
            );
            if !plain {
                return Err(CloakError::InvalidInput(format!(
                    "Scope {} does not map to a directory under the store root",
                    scope
                )));
            }
        }
        Ok(self.root.join(scope.owner()).join(scope.repository()))
    }
}

#[async_trait]
impl ContentStore for DirectoryStore {
    async fn read(&self, scope: &Scope, path: &str) -> Result<StoredFile> {
        let path = normalize_path(path)?;
        let full = self.scope_dir(scope)?.join(&path);
        let content = run_blocking(move || read_existing(&full)).await?;
        let content = content.ok_or_else(|| CloakError::NotFound(path.clone()))?;
        Ok(StoredFile {
            revision: content_revision(&content),
            content,
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
        let full = self.scope_dir(scope)?.join(&path);
        let expected = revision.cloned();
        let new_revision = content_revision(&content);
        let checked_path = path.clone();

        run_blocking(move || -> Result<()> {
            let current = read_existing(&full)?.map(|bytes| content_revision(&bytes));
            check_revision(&checked_path, current.as_ref(), expected.as_ref())?;
            write_atomic(&full, &content)?;
            Ok(())
        })
        .await?;

        debug!(scope = %scope, path = %path, message = %message, "file written");
        Ok(new_revision)
    }

    async fn list(&self, scope: &Scope, path: &str) -> Result<Vec<FileEntry>> {
        let dir = normalize_dir(path)?;
        let full = self.scope_dir(scope)?.join(&dir);
        run_blocking(move || list_directory(&full, &dir)).await
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CloakError::Storage(format!("Store task failed: {}", e)))?
}

fn read_existing(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        // Reading a directory as a file is "no such file" from the caller's view.
        Err(_) if path.is_dir() => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn list_directory(full: &Path, dir: &str) -> Result<Vec<FileEntry>> {
    let join = |name: &str| {
        if dir.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", dir, name)
        }
    };

    if full.is_file() {
        let content = fs::read(full)?;
        let name = dir.rsplit('/').next().unwrap_or(dir).to_string();
        return Ok(vec![FileEntry {
            name,
            path: dir.to_string(),
            kind: EntryKind::File,
            revision: Some(content_revision(&content)),
        }]);
    }

    let reader = match fs::read_dir(full) {
        Ok(reader) => reader,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return if dir.is_empty() {
                Ok(Vec::new())
            } else {
                Err(CloakError::NotFound(dir.to_string()))
            };
        }
        Err(err) => return Err(err.into()),
    };

    let mut entries = Vec::new();
    for item in reader {
        let item = item?;
        let name = item.file_name().to_string_lossy().to_string();
        if name.contains(TEMP_MARKER) {
            continue;
        }
        let file_type = item.file_type()?;
        if file_type.is_dir() {
            entries.push(FileEntry {
                path: join(&name),
                name,
                kind: EntryKind::Directory,
                revision: None,
            });
        } else if file_type.is_file() {
            let content = fs::read(item.path())?;
            entries.push(FileEntry {
                path: join(&name),
                name,
                kind: EntryKind::File,
                revision: Some(content_revision(&content)),
            });
        }
    }
    Ok(entries)
}
