//! Password scopes.
//!
//! A scope is one repository in the hosted store. Passphrases are cached,
//! verified and established per scope, keyed by the structured pair rather
//! than a formatted string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CloakError;

/// An `(owner, repository)` pair identifying a password domain.
///
/// Serialized as its `owner/repository` text; deserializing validates it
/// like [`Scope::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Scope {
    owner: String,
    repository: String,
}

impl Scope {
    /// Create a scope.
    ///
    /// Each component must be a single path segment: not empty, not `.` or
    /// `..`, and free of `/`, `\` and control characters.
    pub fn new(owner: impl Into<String>, repository: impl Into<String>) -> crate::Result<Self> {
        let owner = owner.into();
        let repository = repository.into();
        for (label, value) in [("owner", &owner), ("repository", &repository)] {
            if value.trim().is_empty() {
                return Err(CloakError::InvalidInput(format!(
                    "Scope {} cannot be empty",
                    label
                )));
            }
            if value.contains('/') {
                return Err(CloakError::InvalidInput(format!(
                    "Scope {} cannot contain '/': {}",
                    label, value
                )));
            }
            if value == "." || value == ".." {
                return Err(CloakError::InvalidInput(format!(
                    "Scope {} cannot be '{}'",
                    label, value
                )));
            }
            if value.chars().any(|c| c == '\\' || c.is_control()) {
                return Err(CloakError::InvalidInput(format!(
                    "Scope {} contains an invalid character: {:?}",
                    label, value
                )));
            }
        }
        Ok(Self { owner, repository })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repository)
    }
}

impl FromStr for Scope {
    type Err = CloakError;

    /// Parse `owner/repository`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (owner, repository) = value.split_once('/').ok_or_else(|| {
            CloakError::InvalidInput(format!(
                "Invalid scope (expected owner/repository): {}",
                value
            ))
        })?;
        Scope::new(owner, repository)
    }
}

impl TryFrom<String> for Scope {
    type Error = CloakError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let scope: Scope = "alice/notes".parse().unwrap();
        assert_eq!(scope.owner(), "alice");
        assert_eq!(scope.repository(), "notes");
        assert_eq!(scope.to_string(), "alice/notes");
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!("alice".parse::<Scope>().is_err());
        assert!("/notes".parse::<Scope>().is_err());
        assert!("alice/".parse::<Scope>().is_err());
        assert!("alice/notes/extra".parse::<Scope>().is_err());
    }

    #[test]
    fn test_rejects_relative_segments() {
        for value in ["../..", "./notes", "alice/..", "../notes", "./."] {
            assert!(value.parse::<Scope>().is_err(), "{}", value);
        }
        assert!(Scope::new("..", "notes").is_err());
        assert!(Scope::new("alice", ".").is_err());
        // Dots inside a name are fine.
        assert!(Scope::new("alice", "notes.v2").is_ok());
        assert!(Scope::new("alice", "..hidden").is_ok());
    }

    #[test]
    fn test_rejects_separators_and_control_characters() {
        assert!(Scope::new("alice", "..\\..").is_err());
        assert!(Scope::new("ali\\ce", "notes").is_err());
        assert!(Scope::new("alice", "no\ntes").is_err());
        assert!(Scope::new("alice\0", "notes").is_err());
    }

    #[test]
    fn test_serde_goes_through_validation() {
        let scope: Scope = "alice/notes".parse().unwrap();
        let json = serde_json::to_string(&scope).unwrap();
        assert_eq!(json, "\"alice/notes\"");
        assert_eq!(serde_json::from_str::<Scope>(&json).unwrap(), scope);

        assert!(serde_json::from_str::<Scope>("\"../..\"").is_err());
        assert!(serde_json::from_str::<Scope>("\"alice\"").is_err());
    }

    #[test]
    fn test_components_do_not_collide() {
        // "a-b" + "c" and "a" + "b-c" would collide under naive joining with '-'.
        let first = Scope::new("a-b", "c").unwrap();
        let second = Scope::new("a", "b-c").unwrap();
        assert_ne!(first, second);
    }
}
