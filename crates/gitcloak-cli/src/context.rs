//! Application context for the GitCloak CLI.
//!
//! Bundles the parsed arguments with the loaded config so handlers don't
//! thread both through every call.

use std::path::PathBuf;

use gitcloak_core::{DirectoryStore, Session};

use crate::cli::Cli;
use crate::config::{default_config_path, read_config, CloakConfig};
use crate::prompt::select_prompt;

pub struct AppContext<'a> {
    cli: &'a Cli,
    config_path: PathBuf,
    config: CloakConfig,
}

impl<'a> AppContext<'a> {
    /// Resolve the config path and load the config (defaults if absent).
    pub fn load(cli: &'a Cli) -> anyhow::Result<Self> {
        let config_path = match &cli.config {
            Some(path) => path.clone(),
            None => default_config_path()?,
        };
        let config = read_config(&config_path)?;
        Ok(Self {
            cli,
            config_path,
            config,
        })
    }

    pub fn config(&self) -> &CloakConfig {
        &self.config
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Store root: `--root` / `GITCLOAK_ROOT`, then config, then XDG default.
    pub fn store_root(&self) -> anyhow::Result<PathBuf> {
        match &self.cli.root {
            Some(root) => Ok(root.clone()),
            None => self.config.store_root(),
        }
    }

    /// A fresh session over the on-disk store.
    pub fn session(&self) -> anyhow::Result<Session<DirectoryStore>> {
        Ok(Session::new(
            DirectoryStore::new(self.store_root()?),
            self.config.codec()?,
            select_prompt(self.cli.no_input),
        ))
    }

    /// Level for the `gitcloak` log targets.
    pub fn log_level(&self) -> &str {
        &self.config.log.level
    }

    pub fn no_input(&self) -> bool {
        self.cli.no_input
    }
}
