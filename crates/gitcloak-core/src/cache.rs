//! In-memory password cache.
//!
//! Maps each [`Scope`] to its passphrase for the lifetime of the session.
//! Entries live only in process memory and are zeroized when replaced,
//! removed, or dropped. Nothing here checks correctness; callers verify
//! a passphrase before calling [`PasswordCache::unlock`].

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use secrecy::SecretString;
use tracing::info;

use crate::crypto::codec::duplicate_secret;
use crate::scope::Scope;

/// Per-scope passphrase store with lock/unlock semantics.
///
/// Writers replace whole entries under the write lock; readers receive an
/// owned copy, so nobody observes a half-updated entry.
#[derive(Default)]
pub struct PasswordCache {
    entries: RwLock<HashMap<Scope, SecretString>>,
}

impl PasswordCache {
    /// Create an empty cache (every scope locked).
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the passphrase for `scope`.
    pub fn unlock(&self, scope: &Scope, passphrase: SecretString) {
        self.write().insert(scope.clone(), passphrase);
        info!(scope = %scope, "scope unlocked");
    }

    /// Forget the passphrase for `scope`. No-op when already locked.
    pub fn lock(&self, scope: &Scope) {
        if self.write().remove(scope).is_some() {
            info!(scope = %scope, "scope locked");
        }
    }

    /// Forget every cached passphrase.
    pub fn lock_all(&self) {
        self.write().clear();
    }

    pub fn get(&self, scope: &Scope) -> Option<SecretString> {
        self.read().get(scope).map(duplicate_secret)
    }

    pub fn is_unlocked(&self, scope: &Scope) -> bool {
        self.read().contains_key(scope)
    }

    /// Scopes currently holding a passphrase.
    pub fn unlocked_scopes(&self) -> Vec<Scope> {
        let mut scopes: Vec<Scope> = self.read().keys().cloned().collect();
        scopes.sort();
        scopes
    }

    // A panic while holding the lock cannot leave a half-written entry
    // (insert/remove are single operations), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Scope, SecretString>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Scope, SecretString>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for PasswordCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCache")
            .field("unlocked", &self.unlocked_scopes())
            .finish()
    }
}
