use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use gitcloak_core::storage::{FileEntry, MemoryStore, StoredFile};
use gitcloak_core::{
    CloakError, Codec, ContentStore, NewPassphrase, PassphrasePrompt, PromptPurpose, Result,
    Revision, Scope, ScopeState, Session, StaticPrompt, ARTIFACT_PATH,
};

fn test_codec() -> Codec {
    Codec::new(10, 10).expect("codec parameters should be valid")
}

fn scope() -> Scope {
    "alice/notes".parse().expect("scope should parse")
}

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

/// Answers requests from a fixed script; an exhausted script declines.
#[derive(Default)]
struct ScriptedPrompt {
    existing: Mutex<VecDeque<String>>,
    created: Mutex<VecDeque<(String, String)>>,
    purposes: Mutex<Vec<PromptPurpose>>,
}

impl ScriptedPrompt {
    fn with_answers(answers: &[&str]) -> Self {
        let prompt = Self::default();
        prompt
            .existing
            .lock()
            .unwrap()
            .extend(answers.iter().map(|a| a.to_string()));
        prompt
    }

    fn with_new(passphrase: &str, confirmation: &str) -> Self {
        let prompt = Self::default();
        prompt
            .created
            .lock()
            .unwrap()
            .push_back((passphrase.to_string(), confirmation.to_string()));
        prompt
    }
}

impl PassphrasePrompt for ScriptedPrompt {
    fn existing(&self, _scope: &Scope, purpose: PromptPurpose) -> Result<Option<SecretString>> {
        self.purposes.lock().unwrap().push(purpose);
        Ok(self.existing.lock().unwrap().pop_front().map(SecretString::from))
    }

    fn create(&self, _scope: &Scope) -> Result<Option<NewPassphrase>> {
        Ok(self
            .created
            .lock()
            .unwrap()
            .pop_front()
            .map(|(passphrase, confirmation)| NewPassphrase {
                passphrase: SecretString::from(passphrase),
                confirmation: SecretString::from(confirmation),
            }))
    }
}

/// Store wrapper whose writes can be made to fail on demand.
struct FlakyStore {
    inner: Arc<MemoryStore>,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentStore for FlakyStore {
    async fn read(&self, scope: &Scope, path: &str) -> Result<StoredFile> {
        self.inner.read(scope, path).await
    }

    async fn write(
        &self,
        scope: &Scope,
        path: &str,
        content: Vec<u8>,
        revision: Option<&Revision>,
        message: &str,
    ) -> Result<Revision> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CloakError::Storage("network unreachable".to_string()));
        }
        self.inner.write(scope, path, content, revision, message).await
    }

    async fn list(&self, scope: &Scope, path: &str) -> Result<Vec<FileEntry>> {
        self.inner.list(scope, path).await
    }
}

fn session_over(store: Arc<MemoryStore>, prompt: ScriptedPrompt) -> Session<Arc<MemoryStore>> {
    Session::new(store, test_codec(), Box::new(Arc::new(prompt)))
}

#[tokio::test]
async fn test_bootstrap_then_load() {
    let store = Arc::new(MemoryStore::new());
    let session = session_over(
        store.clone(),
        ScriptedPrompt::with_new("correct-horse", "correct-horse"),
    );

    assert_eq!(
        session.scope_state(&scope()).await.unwrap(),
        ScopeState::NoArtifact
    );
    let saved = session
        .save_file(&scope(), "notes.md", b"hello", None)
        .await
        .expect("save should succeed");

    assert!(store.contains(&scope(), ARTIFACT_PATH));
    assert_eq!(
        session.scope_state(&scope()).await.unwrap(),
        ScopeState::Unlocked
    );
    let loaded = session
        .load_file(&scope(), &saved.path)
        .await
        .expect("load should succeed");
    assert_eq!(loaded.content, b"hello");
}

#[tokio::test]
async fn test_new_session_must_unlock() {
    let store = Arc::new(MemoryStore::new());
    let first = session_over(
        store.clone(),
        ScriptedPrompt::with_new("correct-horse", "correct-horse"),
    );
    let saved = first
        .save_file(&scope(), "notes.md", b"hello", None)
        .await
        .expect("save should succeed");

    let second = session_over(store.clone(), ScriptedPrompt::default());
    assert_eq!(
        second.scope_state(&scope()).await.unwrap(),
        ScopeState::Locked
    );

    let wrong = second.unlock_scope(&scope(), secret("wrong")).await;
    assert!(matches!(wrong, Err(CloakError::IncorrectPassphrase)));
    assert!(!second.is_unlocked(&scope()));

    second
        .unlock_scope(&scope(), secret("correct-horse"))
        .await
        .expect("unlock should succeed");
    let loaded = second.load_file(&scope(), &saved.path).await.unwrap();
    assert_eq!(loaded.content, b"hello");
}

#[tokio::test]
async fn test_bootstrap_mismatch_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let session = session_over(store.clone(), ScriptedPrompt::with_new("a", "b"));

    let result = session.save_file(&scope(), "notes.md", b"hello", None).await;

    assert!(matches!(result, Err(CloakError::PassphraseMismatch)));
    assert!(!store.contains(&scope(), ARTIFACT_PATH));
    assert!(!store.contains(&scope(), "notes.md.age"));
    assert!(!session.is_unlocked(&scope()));
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn test_load_without_artifact_is_missing_artifact() {
    let store = Arc::new(MemoryStore::new());
    store
        .write(&scope(), "orphan.md.age", b"whatever".to_vec(), None, "Create")
        .await
        .unwrap();
    let prompt = Arc::new(ScriptedPrompt::with_answers(&["correct-horse"]));
    let session = Session::new(store.clone(), test_codec(), Box::new(prompt.clone()));

    let result = session.load_file(&scope(), "orphan.md.age").await;
    assert!(matches!(result, Err(CloakError::MissingArtifact)));

    let result = session.load_file(&scope(), "never-written.md.age").await;
    assert!(matches!(result, Err(CloakError::MissingArtifact)));

    assert!(!store.contains(&scope(), ARTIFACT_PATH));
    assert!(prompt.purposes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_stale_revision_conflicts() {
    let store = Arc::new(MemoryStore::new());
    let session = Session::new(
        store.clone(),
        test_codec(),
        Box::new(StaticPrompt::new(secret("correct-horse"))),
    );
    let first = session
        .save_file(&scope(), "notes.md", b"v1", None)
        .await
        .unwrap();
    let second = session
        .save_file(&scope(), "notes.md", b"v2", Some(&first.revision))
        .await
        .unwrap();

    let result = session
        .save_file(&scope(), "notes.md", b"stale edit", Some(&first.revision))
        .await;

    assert!(matches!(result, Err(CloakError::RevisionConflict(_))));
    let current = session.load_file(&scope(), "notes.md.age").await.unwrap();
    assert_eq!(current.content, b"v2");
    assert_eq!(current.revision, second.revision);
}

#[tokio::test]
async fn test_locked_load_prompts_and_caches() {
    let store = Arc::new(MemoryStore::new());
    let first = session_over(
        store.clone(),
        ScriptedPrompt::with_new("correct-horse", "correct-horse"),
    );
    first
        .save_file(&scope(), "notes.md", b"hello", None)
        .await
        .unwrap();

    let prompt = Arc::new(ScriptedPrompt::with_answers(&["wrong", "correct-horse"]));
    let session = Session::new(store.clone(), test_codec(), Box::new(prompt.clone()));

    let result = session.load_file(&scope(), "notes.md.age").await;
    assert!(matches!(result, Err(CloakError::IncorrectPassphrase)));
    assert!(!session.is_unlocked(&scope()));

    let loaded = session.load_file(&scope(), "notes.md.age").await.unwrap();
    assert_eq!(loaded.content, b"hello");
    assert!(session.is_unlocked(&scope()));

    // Cached from here on; no third prompt.
    session.load_file(&scope(), "notes.md.age").await.unwrap();
    assert_eq!(
        *prompt.purposes.lock().unwrap(),
        vec![PromptPurpose::Load, PromptPurpose::Load]
    );
}

#[tokio::test]
async fn test_declined_prompt_requires_passphrase() {
    let store = Arc::new(MemoryStore::new());
    let session = session_over(store.clone(), ScriptedPrompt::default());

    let result = session.save_file(&scope(), "notes.md", b"hello", None).await;

    assert!(matches!(result, Err(CloakError::PassphraseRequired)));
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn test_lock_is_idempotent_and_scoped() {
    let store = Arc::new(MemoryStore::new());
    let session = Session::new(
        store,
        test_codec(),
        Box::new(StaticPrompt::new(secret("correct-horse"))),
    );
    let other: Scope = "alice/diary".parse().unwrap();
    session
        .save_file(&scope(), "notes.md", b"hello", None)
        .await
        .unwrap();

    assert!(session.is_unlocked(&scope()));
    assert!(!session.is_unlocked(&other));

    session.lock_scope(&scope());
    session.lock_scope(&scope());
    assert!(!session.is_unlocked(&scope()));
    assert_eq!(
        session.scope_state(&scope()).await.unwrap(),
        ScopeState::Locked
    );
    assert_eq!(
        session.scope_state(&other).await.unwrap(),
        ScopeState::NoArtifact
    );
}

#[tokio::test]
async fn test_failed_bootstrap_write_caches_nothing() {
    let inner = Arc::new(MemoryStore::new());
    let store = FlakyStore::new(inner.clone());
    store.set_failing(true);
    let session = Session::new(
        store,
        test_codec(),
        Box::new(StaticPrompt::new(secret("correct-horse"))),
    );

    let result = session.save_file(&scope(), "notes.md", b"hello", None).await;

    assert!(matches!(result, Err(CloakError::Storage(_))));
    assert!(!session.is_unlocked(&scope()));
    assert!(!inner.contains(&scope(), ARTIFACT_PATH));
}

#[tokio::test]
async fn test_failed_save_write_can_be_retried() {
    let inner = Arc::new(MemoryStore::new());
    let session = Session::new(
        FlakyStore::new(inner.clone()),
        test_codec(),
        Box::new(StaticPrompt::new(secret("correct-horse"))),
    );
    let first = session
        .save_file(&scope(), "notes.md", b"v1", None)
        .await
        .unwrap();

    session.store().set_failing(true);
    let plaintext = b"v2 edit".to_vec();
    let result = session
        .save_file(&scope(), "notes.md", &plaintext, Some(&first.revision))
        .await;
    assert!(matches!(result, Err(CloakError::Storage(_))));

    session.store().set_failing(false);
    session
        .save_file(&scope(), "notes.md", &plaintext, Some(&first.revision))
        .await
        .expect("retry should succeed");
    let loaded = session.load_file(&scope(), "notes.md.age").await.unwrap();
    assert_eq!(loaded.content, b"v2 edit");
}

#[tokio::test]
async fn test_unlock_with_prompt_without_artifact() {
    let prompt = Arc::new(ScriptedPrompt::with_answers(&["correct-horse"]));
    let session = Session::new(
        Arc::new(MemoryStore::new()),
        test_codec(),
        Box::new(prompt.clone()),
    );

    let result = session.unlock_with_prompt(&scope()).await;
    assert!(matches!(result, Err(CloakError::MissingArtifact)));
    assert!(prompt.purposes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_passphrase_never_stored() {
    let store = Arc::new(MemoryStore::new());
    let session = Session::new(
        store.clone(),
        test_codec(),
        Box::new(StaticPrompt::new(secret("correct-horse"))),
    );
    session
        .save_file(&scope(), "notes.md", b"hello", None)
        .await
        .unwrap();

    let pass = secret("correct-horse");
    for path in [ARTIFACT_PATH, "notes.md.age"] {
        let stored = store.read(&scope(), path).await.unwrap();
        let text = String::from_utf8(stored.content).unwrap();
        assert!(!text.contains(pass.expose_secret()));
        assert!(!text.contains("hello"));
    }
}
