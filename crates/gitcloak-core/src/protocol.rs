//! Unlock/verify protocol.
//!
//! Per scope, the state is derived on demand from two facts: whether the
//! store holds a `.gitcloak` artifact, and whether the cache holds a
//! passphrase.
//!
//! | artifact | cached | state        | way forward                         |
//! |----------|--------|--------------|-------------------------------------|
//! | absent   | -      | `NoArtifact` | bootstrap (new passphrase, twice)   |
//! | present  | no     | `Locked`     | verify a candidate against artifact |
//! | present  | yes    | `Unlocked`   | use cached passphrase as-is         |
//!
//! The cache is written only after a bootstrap's artifact write or a
//! verification has fully succeeded, so a failed attempt never leaves a
//! passphrase behind.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::artifact::{verify_document, VerificationArtifact, ARTIFACT_PATH};
use crate::cache::PasswordCache;
use crate::crypto::codec::duplicate_secret;
use crate::crypto::{validate_passphrase, Codec};
use crate::error::{CloakError, Result};
use crate::prompt::{NewPassphrase, PassphrasePrompt, PromptPurpose};
use crate::scope::Scope;
use crate::storage::ContentStore;

/// Commit message used when the artifact is first written.
pub const BOOTSTRAP_MESSAGE: &str = "Initialize GitCloak repository";

/// Observable state of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeState {
    /// No passphrase established yet; the next encrypting save sets one
    NoArtifact,
    /// Passphrase established but not in memory
    Locked,
    /// Cached passphrase in use
    Unlocked,
}

impl fmt::Display for ScopeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScopeState::NoArtifact => "not initialized",
            ScopeState::Locked => "locked",
            ScopeState::Unlocked => "unlocked",
        };
        f.write_str(label)
    }
}

/// Internal view of a scope carrying what each branch needs.
enum Resolution {
    NoArtifact,
    Locked(String),
    Unlocked(SecretString),
}

/// Protocol bound to one store, one cache and one codec.
pub struct UnlockProtocol<'a, S: ContentStore + ?Sized> {
    store: &'a S,
    cache: &'a PasswordCache,
    codec: Codec,
}

impl<'a, S: ContentStore + ?Sized> UnlockProtocol<'a, S> {
    pub fn new(store: &'a S, cache: &'a PasswordCache, codec: Codec) -> Self {
        Self {
            store,
            cache,
            codec,
        }
    }

    /// Fetch the raw artifact document, `None` if the scope has none.
    pub async fn fetch_artifact(&self, scope: &Scope) -> Result<Option<String>> {
        match self.store.read(scope, ARTIFACT_PATH).await {
            Ok(file) => {
                // Invalid UTF-8 can never verify; keep it as a present-but-bad artifact.
                Ok(Some(String::from_utf8_lossy(&file.content).into_owned()))
            }
            Err(CloakError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn state(&self, scope: &Scope) -> Result<ScopeState> {
        Ok(match self.resolve(scope).await? {
            Resolution::NoArtifact => ScopeState::NoArtifact,
            Resolution::Locked(_) => ScopeState::Locked,
            Resolution::Unlocked(_) => ScopeState::Unlocked,
        })
    }

    async fn resolve(&self, scope: &Scope) -> Result<Resolution> {
        let Some(document) = self.fetch_artifact(scope).await? else {
            return Ok(Resolution::NoArtifact);
        };
        Ok(match self.cache.get(scope) {
            Some(passphrase) => Resolution::Unlocked(passphrase),
            None => Resolution::Locked(document),
        })
    }

    /// Establish the scope's passphrase: write a fresh artifact, then cache.
    ///
    /// # Errors
    ///
    /// - `CloakError::PassphraseMismatch` if confirmation differs
    /// - `CloakError::InvalidInput` for an empty passphrase
    /// - any store error from writing the artifact (including
    ///   `RevisionConflict` if another client bootstrapped first)
    ///
    /// On error nothing is written and nothing is cached.
    pub async fn bootstrap(&self, scope: &Scope, new: NewPassphrase) -> Result<SecretString> {
        if new.passphrase.expose_secret() != new.confirmation.expose_secret() {
            return Err(CloakError::PassphraseMismatch);
        }
        validate_passphrase(new.passphrase.expose_secret())?;

        let codec = self.codec;
        let passphrase = duplicate_secret(&new.passphrase);
        tokio::task::yield_now().await;
        let artifact = tokio::task::spawn_blocking(move || {
            VerificationArtifact::create(&codec, &passphrase)
        })
        .await
        .map_err(|e| CloakError::Crypto(format!("Codec task failed: {}", e)))??;
        tokio::task::yield_now().await;

        let document = artifact.to_document()?;
        self.store
            .write(
                scope,
                ARTIFACT_PATH,
                document.into_bytes(),
                None,
                BOOTSTRAP_MESSAGE,
            )
            .await?;

        self.cache.unlock(scope, duplicate_secret(&new.passphrase));
        info!(scope = %scope, "repository passphrase established");
        Ok(new.passphrase)
    }

    /// Check `candidate` against `document`; cache it only on success.
    async fn verify(
        &self,
        scope: &Scope,
        document: String,
        candidate: SecretString,
    ) -> Result<SecretString> {
        let codec = self.codec;
        let probe = duplicate_secret(&candidate);
        tokio::task::yield_now().await;
        let accepted =
            tokio::task::spawn_blocking(move || verify_document(&codec, &document, &probe))
                .await
                .map_err(|e| CloakError::Crypto(format!("Codec task failed: {}", e)))?;
        tokio::task::yield_now().await;

        if !accepted {
            warn!(scope = %scope, "passphrase rejected");
            return Err(CloakError::IncorrectPassphrase);
        }
        self.cache.unlock(scope, duplicate_secret(&candidate));
        Ok(candidate)
    }

    /// Unlock with an explicitly supplied candidate.
    pub async fn unlock(&self, scope: &Scope, candidate: SecretString) -> Result<()> {
        let document = self
            .fetch_artifact(scope)
            .await?
            .ok_or(CloakError::MissingArtifact)?;
        self.verify(scope, document, candidate).await?;
        Ok(())
    }

    /// Unlock with a candidate asked from `prompt`. A scope without an
    /// artifact fails before anything is asked.
    pub async fn unlock_with_prompt(
        &self,
        scope: &Scope,
        prompt: &dyn PassphrasePrompt,
    ) -> Result<()> {
        let document = self
            .fetch_artifact(scope)
            .await?
            .ok_or(CloakError::MissingArtifact)?;
        let candidate = prompt
            .existing(scope, PromptPurpose::Unlock)?
            .ok_or(CloakError::PassphraseRequired)?;
        self.verify(scope, document, candidate).await?;
        Ok(())
    }

    /// Resolve the passphrase for an encrypting save, bootstrapping or
    /// verifying through `prompt` as the state demands.
    pub async fn passphrase_for_save(
        &self,
        scope: &Scope,
        prompt: &dyn PassphrasePrompt,
    ) -> Result<SecretString> {
        match self.resolve(scope).await? {
            Resolution::Unlocked(passphrase) => Ok(passphrase),
            Resolution::Locked(document) => {
                let candidate = prompt
                    .existing(scope, PromptPurpose::Save)?
                    .ok_or(CloakError::PassphraseRequired)?;
                self.verify(scope, document, candidate).await
            }
            Resolution::NoArtifact => {
                debug!(scope = %scope, "no artifact; bootstrapping");
                let new = prompt
                    .create(scope)?
                    .ok_or(CloakError::PassphraseRequired)?;
                self.bootstrap(scope, new).await
            }
        }
    }

    /// Resolve the passphrase for decrypting a load. Never bootstraps.
    pub async fn passphrase_for_load(
        &self,
        scope: &Scope,
        prompt: &dyn PassphrasePrompt,
    ) -> Result<SecretString> {
        if let Some(passphrase) = self.cache.get(scope) {
            return Ok(passphrase);
        }
        let document = self
            .fetch_artifact(scope)
            .await?
            .ok_or(CloakError::MissingArtifact)?;
        let candidate = prompt
            .existing(scope, PromptPurpose::Load)?
            .ok_or(CloakError::PassphraseRequired)?;
        self.verify(scope, document, candidate).await
    }

    /// Forget the scope's cached passphrase.
    pub fn lock(&self, scope: &Scope) {
        self.cache.lock(scope);
    }
}
