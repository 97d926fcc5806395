//! Directory listings that know how to refresh themselves.
//!
//! A [`Listing`] remembers which scope and directory it was taken from, so
//! whoever holds one can bring it up to date after a save without any
//! shared refresh hook.

use serde::Serialize;

use crate::error::Result;
use crate::scope::Scope;
use crate::session::Session;
use crate::storage::{ContentStore, FileEntry};

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    scope: Scope,
    directory: String,
    entries: Vec<FileEntry>,
}

impl Listing {
    pub(crate) fn new(scope: Scope, directory: String, entries: Vec<FileEntry>) -> Self {
        Self {
            scope,
            directory,
            entries,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Listed directory, `""` for the scope root.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Entries as of the last refresh, directories first.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-read this listing's directory through `session`.
    pub async fn refresh<S: ContentStore>(&mut self, session: &Session<S>) -> Result<()> {
        session.refresh(self).await
    }

    pub(crate) fn replace_entries(&mut self, entries: Vec<FileEntry>) {
        self.entries = entries;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Codec;
    use crate::prompt::StaticPrompt;
    use crate::storage::MemoryStore;
    use secrecy::SecretString;

    #[tokio::test]
    async fn test_refresh_through_listing_handle() {
        let scope: Scope = "alice/notes".parse().unwrap();
        let session = Session::new(
            MemoryStore::new(),
            Codec::new(10, 10).unwrap(),
            Box::new(StaticPrompt::new(SecretString::from("pw".to_string()))),
        );

        let mut listing = session.list(&scope, "/").await.unwrap();
        assert!(listing.is_empty());
        assert_eq!(listing.directory(), "");

        session.save_file(&scope, "a.md", b"x", None).await.unwrap();
        listing.refresh(&session).await.unwrap();

        assert!(listing.entries().iter().any(|e| e.path == "a.md.age"));
        assert!(listing.entries().iter().any(|e| e.is_artifact()));
    }
}
