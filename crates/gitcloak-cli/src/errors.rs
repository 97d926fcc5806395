//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use gitcloak_core::CloakError;

use crate::constants::{exit_codes, PASSPHRASE_ENV};

/// CLI-specific errors with associated exit codes.
#[derive(Debug, Clone)]
pub enum CliError {
    /// Resource not found (file, directory, artifact)
    NotFound {
        message: String,
        hint: Option<String>,
    },

    /// Authentication failed (wrong passphrase, tampered content)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Optimistic-concurrency conflict on save
    Conflict { message: String, hint: String },

    /// Anything else the core reports
    Other(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } | CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::Conflict { message, hint } => write!(f, "{}\n{}", message, hint),
            CliError::InvalidInput(message) | CliError::Other(message) => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::Conflict { .. } => exit_codes::CONFLICT,
            CliError::Other(_) => exit_codes::FAILURE,
        }
    }

    /// Classify an error chain, translating core errors.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        if let Some(cli) = err.downcast_ref::<CliError>() {
            return cli.clone();
        }
        if let Some(core) = err.downcast_ref::<CloakError>() {
            return CliError::from(core);
        }
        CliError::Other(format!("{:#}", err))
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}

impl From<&CloakError> for CliError {
    fn from(err: &CloakError) -> Self {
        let message = err.to_string();
        match err {
            CloakError::NotFound(_) => CliError::NotFound {
                message,
                hint: None,
            },
            CloakError::MissingArtifact => CliError::NotFound {
                message,
                hint: Some(
                    "Hint: Save a file into the repository first to set its passphrase."
                        .to_string(),
                ),
            },
            CloakError::IncorrectPassphrase
            | CloakError::AuthenticationFailure
            | CloakError::MalformedEnvelope(_) => CliError::AuthFailed {
                message,
                hint: Some(format!(
                    "Hint: Check your passphrase or the {} environment variable.",
                    PASSPHRASE_ENV
                )),
            },
            CloakError::PassphraseRequired => CliError::auth_failed_with_hint(
                message,
                format!(
                    "Hint: Set {} or run interactively without --no-input.",
                    PASSPHRASE_ENV
                ),
            ),
            CloakError::PassphraseMismatch | CloakError::InvalidInput(_) => {
                CliError::InvalidInput(message)
            }
            CloakError::RevisionConflict(_) => CliError::Conflict {
                message,
                hint: "Hint: Open the file again and reapply your changes.".to_string(),
            },
            _ => CliError::Other(message),
        }
    }
}
