//! Content store trait definition.
//!
//! The `ContentStore` trait is the boundary to the hosted repository. The
//! encryption layer only ever sees opaque bytes and revision markers, so any
//! backend that can read, write with a revision check, and list a directory
//! can sit behind it.

use std::sync::Arc;

use async_trait::async_trait;

use super::types::{FileEntry, Revision, StoredFile};
use crate::error::Result;
use crate::scope::Scope;

/// External store interface, one namespace per [`Scope`].
///
/// All implementations must ensure:
/// - `write` without a revision only creates (an existing file is a conflict)
/// - `write` with a revision only updates a file whose current revision matches
/// - a failed write leaves the stored file untouched
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Read a file.
    ///
    /// # Errors
    ///
    /// Returns `CloakError::NotFound` if the file does not exist.
    async fn read(&self, scope: &Scope, path: &str) -> Result<StoredFile>;

    /// Create or update a file.
    ///
    /// # Arguments
    ///
    /// * `revision` - `None` to create, or the revision last observed to update
    /// * `message` - Commit message recorded by the store
    ///
    /// # Returns
    ///
    /// Returns the new revision.
    ///
    /// # Errors
    ///
    /// Returns `CloakError::RevisionConflict` if the revision check fails.
    async fn write(
        &self,
        scope: &Scope,
        path: &str,
        content: Vec<u8>,
        revision: Option<&Revision>,
        message: &str,
    ) -> Result<Revision>;

    /// List a directory (`""` is the scope root). Order is unspecified.
    async fn list(&self, scope: &Scope, path: &str) -> Result<Vec<FileEntry>>;
}

#[async_trait]
impl<T: ContentStore + ?Sized> ContentStore for Arc<T> {
    async fn read(&self, scope: &Scope, path: &str) -> Result<StoredFile> {
        (**self).read(scope, path).await
    }

    async fn write(
        &self,
        scope: &Scope,
        path: &str,
        content: Vec<u8>,
        revision: Option<&Revision>,
        message: &str,
    ) -> Result<Revision> {
        (**self).write(scope, path, content, revision, message).await
    }

    async fn list(&self, scope: &Scope, path: &str) -> Result<Vec<FileEntry>> {
        (**self).list(scope, path).await
    }
}
