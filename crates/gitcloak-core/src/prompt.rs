//! Passphrase prompting.
//!
//! The unlock protocol is plain logic over three states except for one
//! point where it must ask the user for a secret. That point is this trait:
//! the protocol calls it, the host (terminal, GUI, test script) answers, and
//! the protocol resumes. `Ok(None)` means the user declined.

use std::sync::Arc;

use secrecy::SecretString;

use crate::crypto::codec::duplicate_secret;
use crate::error::Result;
use crate::scope::Scope;

/// Why a passphrase for an established scope is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    /// Explicit unlock request
    Unlock,
    /// Opening an encrypted file in a locked scope
    Load,
    /// Saving into a locked scope
    Save,
}

/// A newly chosen passphrase and its confirmation, compared by the protocol.
pub struct NewPassphrase {
    pub passphrase: SecretString,
    pub confirmation: SecretString,
}

/// Host-provided source of passphrases.
pub trait PassphrasePrompt: Send + Sync {
    /// Ask for the passphrase of a scope that already has one.
    fn existing(&self, scope: &Scope, purpose: PromptPurpose) -> Result<Option<SecretString>>;

    /// Ask for a new passphrase (twice) to establish one for `scope`.
    fn create(&self, scope: &Scope) -> Result<Option<NewPassphrase>>;
}

impl<P: PassphrasePrompt + ?Sized> PassphrasePrompt for Arc<P> {
    fn existing(&self, scope: &Scope, purpose: PromptPurpose) -> Result<Option<SecretString>> {
        (**self).existing(scope, purpose)
    }

    fn create(&self, scope: &Scope) -> Result<Option<NewPassphrase>> {
        (**self).create(scope)
    }
}

/// Answers every request with the same passphrase.
///
/// Suits non-interactive hosts where the passphrase comes from the
/// environment; a bootstrap through it always confirms.
pub struct StaticPrompt {
    passphrase: SecretString,
}

impl StaticPrompt {
    pub fn new(passphrase: SecretString) -> Self {
        Self { passphrase }
    }
}

impl PassphrasePrompt for StaticPrompt {
    fn existing(&self, _scope: &Scope, _purpose: PromptPurpose) -> Result<Option<SecretString>> {
        Ok(Some(duplicate_secret(&self.passphrase)))
    }

    fn create(&self, _scope: &Scope) -> Result<Option<NewPassphrase>> {
        Ok(Some(NewPassphrase {
            passphrase: duplicate_secret(&self.passphrase),
            confirmation: duplicate_secret(&self.passphrase),
        }))
    }
}
