//! Save/load orchestration.
//!
//! A [`Session`] owns one store, one password cache and one prompt. Every
//! user-content save is encrypted and lands under the `.age` suffix;
//! loads decrypt suffixed paths and pass everything else through verbatim.
//!
//! Nothing reaches the store until encryption has succeeded, and a store
//! failure after that leaves the caller holding its plaintext to retry with.

use secrecy::SecretString;
use tracing::debug;
use zeroize::Zeroizing;

use crate::cache::PasswordCache;
use crate::crypto::{Codec, EncryptedBlob};
use crate::error::{CloakError, Result};
use crate::listing::Listing;
use crate::prompt::PassphrasePrompt;
use crate::protocol::{ScopeState, UnlockProtocol};
use crate::scope::Scope;
use crate::storage::{
    normalize_dir, normalize_path, sort_entries, ContentStore, FileEntry, Revision,
};

/// Suffix marking a path as encrypted.
pub const ENCRYPTED_SUFFIX: &str = ".age";

pub fn is_encrypted_path(path: &str) -> bool {
    path.len() > ENCRYPTED_SUFFIX.len() && path.ends_with(ENCRYPTED_SUFFIX)
}

/// The stored path for a logical path, with the suffix appended if absent.
pub fn encrypted_path(path: &str) -> String {
    if is_encrypted_path(path) {
        path.to_string()
    } else {
        format!("{}{}", path, ENCRYPTED_SUFFIX)
    }
}

/// Outcome of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// Stored path, suffix included
    pub path: String,
    pub revision: Revision,
}

/// Outcome of a successful load.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: String,
    pub content: Vec<u8>,
    pub revision: Revision,
    /// Whether `content` was decrypted
    pub encrypted: bool,
}

pub struct Session<S: ContentStore> {
    store: S,
    cache: PasswordCache,
    codec: Codec,
    prompt: Box<dyn PassphrasePrompt>,
}

impl<S: ContentStore> Session<S> {
    /// Start a session with an empty cache.
    pub fn new(store: S, codec: Codec, prompt: Box<dyn PassphrasePrompt>) -> Self {
        Self {
            store,
            cache: PasswordCache::new(),
            codec,
            prompt,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Scopes whose passphrase is currently cached.
    pub fn unlocked_scopes(&self) -> Vec<Scope> {
        self.cache.unlocked_scopes()
    }

    fn protocol(&self) -> UnlockProtocol<'_, S> {
        UnlockProtocol::new(&self.store, &self.cache, self.codec)
    }

    /// Encrypt `plaintext` and write it under the suffixed form of `path`.
    ///
    /// `prior_revision` is `None` for a new file, else the revision the
    /// caller last observed. The passphrase is resolved first: bootstrapped
    /// when the scope has no artifact, verified when locked, reused when
    /// unlocked.
    ///
    /// # Errors
    ///
    /// - `CloakError::InvalidInput` for an empty path
    /// - `CloakError::PassphraseMismatch` / `CloakError::IncorrectPassphrase`
    ///   / `CloakError::PassphraseRequired` while resolving the passphrase
    /// - `CloakError::RevisionConflict` if the store moved past `prior_revision`
    pub async fn save_file(
        &self,
        scope: &Scope,
        path: &str,
        plaintext: &[u8],
        prior_revision: Option<&Revision>,
    ) -> Result<SavedFile> {
        let path = encrypted_path(&normalize_path(path)?);
        let passphrase = self
            .protocol()
            .passphrase_for_save(scope, self.prompt.as_ref())
            .await?;

        let blob = self
            .codec
            .encode_in_background(Zeroizing::new(plaintext.to_vec()), passphrase)
            .await?;

        let message = match prior_revision {
            Some(_) => format!("Update {}", path),
            None => format!("Create {}", path),
        };
        let revision = self
            .store
            .write(
                scope,
                &path,
                blob.into_string().into_bytes(),
                prior_revision,
                &message,
            )
            .await?;

        debug!(scope = %scope, path = %path, "file saved");
        Ok(SavedFile { path, revision })
    }

    /// Read `path`, decrypting it if it carries the encrypted suffix.
    ///
    /// Encrypted loads resolve the passphrase before touching the file and
    /// never bootstrap.
    ///
    /// # Errors
    ///
    /// - `CloakError::MissingArtifact` for an encrypted path in a scope
    ///   without a passphrase
    /// - `CloakError::IncorrectPassphrase` / `CloakError::PassphraseRequired`
    ///   while unlocking
    /// - `CloakError::AuthenticationFailure` / `CloakError::MalformedEnvelope`
    ///   if the stored blob does not decrypt
    /// - `CloakError::NotFound` if the file does not exist
    pub async fn load_file(&self, scope: &Scope, path: &str) -> Result<LoadedFile> {
        let path = normalize_path(path)?;
        if !is_encrypted_path(&path) {
            let file = self.store.read(scope, &path).await?;
            debug!(scope = %scope, path = %file.path, "plain file loaded");
            return Ok(LoadedFile {
                path: file.path,
                content: file.content,
                revision: file.revision,
                encrypted: false,
            });
        }

        let passphrase = self
            .protocol()
            .passphrase_for_load(scope, self.prompt.as_ref())
            .await?;
        let file = self.store.read(scope, &path).await?;
        let text = String::from_utf8(file.content).map_err(|_| {
            CloakError::MalformedEnvelope("Encrypted file is not text".to_string())
        })?;
        let content = self
            .codec
            .decode_in_background(EncryptedBlob::from(text), passphrase)
            .await?;

        debug!(scope = %scope, path = %file.path, "encrypted file loaded");
        Ok(LoadedFile {
            path: file.path,
            content,
            revision: file.revision,
            encrypted: true,
        })
    }

    /// Verify `candidate` against the scope's artifact and cache it.
    ///
    /// # Errors
    ///
    /// `CloakError::MissingArtifact` or `CloakError::IncorrectPassphrase`.
    pub async fn unlock_scope(&self, scope: &Scope, candidate: SecretString) -> Result<()> {
        self.protocol().unlock(scope, candidate).await
    }

    /// Unlock by asking the prompt for the scope's passphrase.
    pub async fn unlock_with_prompt(&self, scope: &Scope) -> Result<()> {
        self.protocol()
            .unlock_with_prompt(scope, self.prompt.as_ref())
            .await
    }

    /// Forget the scope's passphrase. Always succeeds.
    pub fn lock_scope(&self, scope: &Scope) {
        self.protocol().lock(scope);
    }

    /// Forget every cached passphrase.
    pub fn lock_all(&self) {
        self.cache.lock_all();
    }

    pub fn is_unlocked(&self, scope: &Scope) -> bool {
        self.cache.is_unlocked(scope)
    }

    pub async fn scope_state(&self, scope: &Scope) -> Result<ScopeState> {
        self.protocol().state(scope).await
    }

    /// Current revision of `path`, `None` if it does not exist.
    pub async fn current_revision(&self, scope: &Scope, path: &str) -> Result<Option<Revision>> {
        match self.store.read(scope, path).await {
            Ok(file) => Ok(Some(file.revision)),
            Err(CloakError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// List `dir` (`""` for the scope root), directories first.
    pub async fn list(&self, scope: &Scope, dir: &str) -> Result<Listing> {
        let dir = normalize_dir(dir)?;
        let entries = self.list_entries(scope, &dir).await?;
        Ok(Listing::new(scope.clone(), dir, entries))
    }

    /// Re-read the directory a listing was taken from.
    pub async fn refresh(&self, listing: &mut Listing) -> Result<()> {
        let entries = self.list_entries(listing.scope(), listing.directory()).await?;
        listing.replace_entries(entries);
        Ok(())
    }

    async fn list_entries(&self, scope: &Scope, dir: &str) -> Result<Vec<FileEntry>> {
        let mut entries = self.store.list(scope, dir).await?;
        sort_entries(&mut entries);
        debug!(scope = %scope, dir = %dir, count = entries.len(), "directory listed");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ARTIFACT_PATH;
    use crate::prompt::StaticPrompt;
    use crate::storage::MemoryStore;

    fn scope() -> Scope {
        "alice/notes".parse().unwrap()
    }

    fn session(passphrase: &str) -> Session<MemoryStore> {
        Session::new(
            MemoryStore::new(),
            Codec::new(10, 10).unwrap(),
            Box::new(StaticPrompt::new(SecretString::from(passphrase.to_string()))),
        )
    }

    #[test]
    fn test_encrypted_path_helpers() {
        assert!(is_encrypted_path("a.md.age"));
        assert!(!is_encrypted_path("a.md"));
        assert!(!is_encrypted_path(".age"));
        assert_eq!(encrypted_path("a.md"), "a.md.age");
        assert_eq!(encrypted_path("a.md.age"), "a.md.age");
    }

    #[tokio::test]
    async fn test_save_appends_suffix_and_encrypts() {
        let session = session("correct-horse");

        let saved = session
            .save_file(&scope(), "journal/today.md", b"hello", None)
            .await
            .unwrap();

        assert_eq!(saved.path, "journal/today.md.age");
        let stored = session.store().read(&scope(), &saved.path).await.unwrap();
        assert!(String::from_utf8(stored.content)
            .unwrap()
            .starts_with("-----BEGIN AGE ENCRYPTED FILE-----"));
        assert!(session.store().contains(&scope(), ARTIFACT_PATH));
    }

    #[tokio::test]
    async fn test_commit_messages() {
        let session = session("correct-horse");

        let saved = session
            .save_file(&scope(), "a.md", b"one", None)
            .await
            .unwrap();
        session
            .save_file(&scope(), "a.md", b"two", Some(&saved.revision))
            .await
            .unwrap();

        let messages: Vec<String> = session
            .store()
            .commits()
            .into_iter()
            .map(|c| c.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "Initialize GitCloak repository",
                "Create a.md.age",
                "Update a.md.age",
            ]
        );
    }

    #[tokio::test]
    async fn test_load_round_trip() {
        let session = session("correct-horse");
        session
            .save_file(&scope(), "a.md", b"hello", None)
            .await
            .unwrap();

        let loaded = session.load_file(&scope(), "a.md.age").await.unwrap();
        assert_eq!(loaded.content, b"hello");
        assert!(loaded.encrypted);
    }

    #[tokio::test]
    async fn test_plain_file_passes_through() {
        let session = session("correct-horse");
        session
            .store()
            .write(&scope(), "README.md", b"# hi".to_vec(), None, "Create")
            .await
            .unwrap();

        let loaded = session.load_file(&scope(), "README.md").await.unwrap();
        assert_eq!(loaded.content, b"# hi");
        assert!(!loaded.encrypted);
        assert!(!session.is_unlocked(&scope()));
    }

    #[tokio::test]
    async fn test_empty_path_rejected() {
        let session = session("correct-horse");

        let result = session.save_file(&scope(), "  ", b"x", None).await;
        assert!(matches!(result, Err(CloakError::InvalidInput(_))));
        assert!(session.store().commits().is_empty());

        let result = session.load_file(&scope(), "").await;
        assert!(matches!(result, Err(CloakError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_non_text_blob_is_malformed() {
        let session = session("correct-horse");
        session
            .save_file(&scope(), "a.md", b"hello", None)
            .await
            .unwrap();
        session
            .store()
            .write(&scope(), "b.md.age", vec![0xff, 0xfe], None, "Create")
            .await
            .unwrap();

        let result = session.load_file(&scope(), "b.md.age").await;
        assert!(matches!(result, Err(CloakError::MalformedEnvelope(_))));
    }

    #[tokio::test]
    async fn test_listing_refresh_sees_new_files() {
        let session = session("correct-horse");
        session
            .save_file(&scope(), "b.md", b"x", None)
            .await
            .unwrap();

        let mut listing = session.list(&scope(), "").await.unwrap();
        assert_eq!(listing.entries().len(), 2);

        session
            .save_file(&scope(), "journal/a.md", b"y", None)
            .await
            .unwrap();
        session.refresh(&mut listing).await.unwrap();

        let names: Vec<&str> = listing.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["journal", ".gitcloak", "b.md.age"]);
    }

    #[tokio::test]
    async fn test_current_revision() {
        let session = session("correct-horse");
        assert!(session
            .current_revision(&scope(), "a.md.age")
            .await
            .unwrap()
            .is_none());

        let saved = session
            .save_file(&scope(), "a.md", b"x", None)
            .await
            .unwrap();
        assert_eq!(
            session.current_revision(&scope(), "a.md.age").await.unwrap(),
            Some(saved.revision)
        );
    }
}
