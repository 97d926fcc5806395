//! Error types for GitCloak core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages and exit codes.
//!
//! No variant ever carries a passphrase, plaintext, or key material.

use thiserror::Error;

/// Result type alias for GitCloak operations.
pub type Result<T> = std::result::Result<T, CloakError>;

/// Core error type for GitCloak operations.
#[derive(Debug, Error)]
pub enum CloakError {
    /// New passphrase and its confirmation differ during bootstrap
    #[error("Passphrases do not match")]
    PassphraseMismatch,

    /// Candidate passphrase failed verification against the scope's artifact
    #[error("Incorrect passphrase")]
    IncorrectPassphrase,

    /// Encrypted content exists but the scope has no verification artifact
    #[error("Repository has not been initialized with GitCloak (no .gitcloak file)")]
    MissingArtifact,

    /// Ciphertext failed authentication (wrong passphrase or tampered data)
    #[error("Decryption failed: wrong passphrase or corrupted content")]
    AuthenticationFailure,

    /// Text is not a validly framed encrypted envelope
    #[error("Malformed encrypted envelope: {0}")]
    MalformedEnvelope(String),

    /// The user declined to supply a passphrase
    #[error("A passphrase is required for this operation")]
    PassphraseRequired,

    /// File not found in the external store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Optimistic-concurrency check failed on write
    #[error("Revision conflict on {0}: the file changed since it was last read")]
    RevisionConflict(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Encryption machinery error not attributable to the input
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl CloakError {
    /// Whether the UI should offer another passphrase attempt.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            CloakError::IncorrectPassphrase | CloakError::AuthenticationFailure
        )
    }
}
