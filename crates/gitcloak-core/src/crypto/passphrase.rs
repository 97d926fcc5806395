//! Passphrase validation.
//!
//! Applied when a scope's passphrase is first established. Candidates
//! offered for an existing scope are never validated here; they are
//! simply tested against the verification artifact.

use crate::error::{CloakError, Result};

/// Validate a newly chosen passphrase.
///
/// # Requirements
///
/// - Not empty or only whitespace
///
/// # Examples
///
/// ```
/// use gitcloak_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase("correct-horse").is_ok());
/// assert!(validate_passphrase("   ").is_err());
/// ```
pub fn validate_passphrase(passphrase: &str) -> Result<()> {
    if passphrase.trim().is_empty() {
        return Err(CloakError::InvalidInput(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    Ok(())
}
