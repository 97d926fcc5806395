use crate::cli::InitArgs;
use crate::config::{write_config, CloakConfig};
use crate::context::AppContext;
use crate::errors::CliError;

/// Write a default config and create the store root.
pub fn handle_init(ctx: &AppContext<'_>, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = ctx.config_path();
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        ))
        .into());
    }

    let root = ctx.store_root()?;
    std::fs::create_dir_all(&root).map_err(|e| {
        anyhow::anyhow!("Failed to create store root {}: {}", root.display(), e)
    })?;
    write_config(config_path, &CloakConfig::with_root(&root))?;

    if !ctx.quiet() {
        println!("Wrote config to {}", config_path.display());
        println!("Repositories live under {}", root.display());
    }
    Ok(())
}
