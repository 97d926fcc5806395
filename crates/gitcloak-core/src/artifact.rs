//! The per-scope verification artifact (`.gitcloak`).
//!
//! A small JSON document holding a well-known constant encrypted under the
//! scope's passphrase. Decrypting it back to that constant proves a
//! candidate passphrase is correct without the passphrase ever being stored.
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "verification": "-----BEGIN AGE ENCRYPTED FILE-----\n...",
//!   "createdAt": "2026-01-01T00:00:00Z"
//! }
//! ```
//!
//! The field names and the constant are part of the on-disk format; changing
//! them would lock users out of every repository created before the change.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::crypto::{Codec, EncryptedBlob};
use crate::error::Result;

/// Reserved path of the artifact, relative to the scope root.
pub const ARTIFACT_PATH: &str = ".gitcloak";

/// Current document format version.
pub const ARTIFACT_VERSION: &str = "1.0";

/// The plaintext sealed inside every artifact.
const VERIFICATION_STRING: &str = "gitcloak-password-verification-v1";

/// Parsed form of a `.gitcloak` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationArtifact {
    pub version: String,
    pub verification: String,
    pub created_at: DateTime<Utc>,
}

impl VerificationArtifact {
    /// Seal the verification constant under `passphrase`.
    pub fn create(codec: &Codec, passphrase: &SecretString) -> Result<Self> {
        let blob = codec.encode(VERIFICATION_STRING.as_bytes(), passphrase)?;
        Ok(Self {
            version: ARTIFACT_VERSION.to_string(),
            verification: blob.into_string(),
            created_at: Utc::now(),
        })
    }

    /// Serialize as the pretty-printed JSON stored in the repository.
    pub fn to_document(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_document(document: &str) -> Result<Self> {
        Ok(serde_json::from_str(document)?)
    }

    /// Whether this reader understands the document's format.
    pub fn is_supported_version(&self) -> bool {
        self.version.split('.').next() == Some("1")
    }

    /// Test `candidate` against this artifact.
    pub fn verify(&self, codec: &Codec, candidate: &SecretString) -> bool {
        if !self.is_supported_version() {
            return false;
        }
        let blob = EncryptedBlob::from(self.verification.clone());
        match codec.decode(&blob, candidate) {
            Ok(plaintext) => plaintext == VERIFICATION_STRING.as_bytes(),
            Err(_) => false,
        }
    }
}

/// Test `candidate` against a raw `.gitcloak` document.
///
/// Fails closed: an unparsable document, unsupported version, or any codec
/// error yields `false`.
pub fn verify_document(codec: &Codec, document: &str, candidate: &SecretString) -> bool {
    match VerificationArtifact::from_document(document) {
        Ok(artifact) => artifact.verify(codec, candidate),
        Err(_) => false,
    }
}
