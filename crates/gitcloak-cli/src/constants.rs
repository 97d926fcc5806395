//! Constants used throughout the CLI.

/// Environment variable supplying the passphrase non-interactively.
pub const PASSPHRASE_ENV: &str = "GITCLOAK_PASSPHRASE";

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// General failure.
    pub const FAILURE: i32 = 1;

    /// File, directory or repository artifact not found.
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong passphrase, undecryptable content).
    pub const AUTH_FAILED: i32 = 5;

    /// The file changed since its revision was observed.
    pub const CONFLICT: i32 = 6;
}
