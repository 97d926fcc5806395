use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use gitcloak_core::{Scope, VERSION};

/// GitCloak - password-protected encryption for files in a repository
#[derive(Parser)]
#[command(name = "gitcloak")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "GITCLOAK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the repositories (overrides config)
    #[arg(long, global = true, env = "GITCLOAK_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_input: bool,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `save` command
#[derive(Args)]
pub struct SaveArgs {
    /// Repository as owner/name
    #[arg(value_name = "SCOPE")]
    pub scope: Scope,

    /// Logical file path (the .age suffix is added if missing)
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Read plaintext from this file instead of stdin
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Revision the update is based on
    ///
    /// Without this flag or --create, the file's current revision is read
    /// just before writing, so the save overwrites any concurrent change
    /// (last writer wins) instead of failing with a conflict.
    #[arg(long, conflicts_with = "create")]
    pub revision: Option<String>,

    /// Create the file; fails if it already exists
    #[arg(long)]
    pub create: bool,
}

/// Arguments for the `open` command
#[derive(Args)]
pub struct OpenArgs {
    /// Repository as owner/name
    #[arg(value_name = "SCOPE")]
    pub scope: Scope,

    /// Stored file path
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Write plaintext to this file instead of stdout
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `ls` command
#[derive(Args)]
pub struct LsArgs {
    /// Repository as owner/name
    #[arg(value_name = "SCOPE")]
    pub scope: Scope,

    /// Directory to list (defaults to the repository root)
    #[arg(value_name = "DIR", default_value = "")]
    pub dir: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `status` command
#[derive(Args)]
pub struct StatusArgs {
    /// Repository as owner/name
    #[arg(value_name = "SCOPE")]
    pub scope: Scope,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `unlock` command
#[derive(Args)]
pub struct UnlockArgs {
    /// Repository as owner/name
    #[arg(value_name = "SCOPE")]
    pub scope: Scope,
}

/// Arguments for the `shell` command
#[derive(Args)]
pub struct ShellArgs {
    /// Keep files in memory instead of the store root
    #[arg(long)]
    pub memory: bool,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default config file
    Init(InitArgs),

    /// Encrypt and save a file
    #[command(after_help = "Pass --revision (or --create for a new file) to have the save fail \
instead of overwriting a change made since you last read the file.")]
    Save(SaveArgs),

    /// Decrypt and print a file
    Open(OpenArgs),

    /// List a repository directory
    Ls(LsArgs),

    /// Show whether a repository is initialized
    Status(StatusArgs),

    /// Check a repository passphrase
    Unlock(UnlockArgs),

    /// Interactive session that keeps passphrases unlocked between commands
    Shell(ShellArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
