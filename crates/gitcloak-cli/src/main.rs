//! GitCloak CLI - password-protected encryption for repository files
//!
//! This is the command-line host for the core library. It supplies
//! passphrases when the unlock protocol asks, renders listings, and owns
//! configuration and logging.

mod cli;
mod commands;
mod config;
mod constants;
mod context;
mod errors;
mod prompt;
mod render;

use clap::Parser;
use gitcloak_core::VERSION;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::commands::{init, ls, misc, open, save, shell, status, unlock};
use crate::context::AppContext;
use crate::errors::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match AppContext::load(&cli) {
        Ok(ctx) => {
            init_tracing(ctx.log_level());
            debug!(config = %ctx.config_path().display(), "config loaded");
            run(&ctx, &cli).await
        }
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        CliError::from_anyhow(&err).exit();
    }
}

/// Initializes the tracing subscriber on stderr.
///
/// `RUST_LOG` wins; otherwise the configured level applies to the
/// `gitcloak` targets and everything else logs at `warn`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gitcloak={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(ctx: &AppContext<'_>, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => init::handle_init(ctx, args)?,
        Some(Commands::Save(args)) => save::handle_save(ctx, args).await?,
        Some(Commands::Open(args)) => open::handle_open(ctx, args).await?,
        Some(Commands::Ls(args)) => ls::handle_ls(ctx, args).await?,
        Some(Commands::Status(args)) => status::handle_status(ctx, args).await?,
        Some(Commands::Unlock(args)) => unlock::handle_unlock(ctx, args).await?,
        Some(Commands::Shell(args)) => shell::handle_shell(ctx, args).await?,
        Some(Commands::Completions(args)) => misc::handle_completions(args.shell)?,
        None => {
            println!("GitCloak v{}", VERSION);
            println!("\nRun `gitcloak --help` for usage information.");
        }
    }
    Ok(())
}
