use std::io::{self, IsTerminal, Read};
use std::path::Path;

use gitcloak_core::session::encrypted_path;
use gitcloak_core::storage::normalize_path;
use gitcloak_core::Revision;

use crate::cli::SaveArgs;
use crate::context::AppContext;

pub async fn handle_save(ctx: &AppContext<'_>, args: &SaveArgs) -> anyhow::Result<()> {
    let plaintext = read_plaintext(args.file.as_deref())?;
    let session = ctx.session()?;

    let revision = if args.create {
        None
    } else if let Some(value) = &args.revision {
        Some(Revision::new(value.as_str()))
    } else {
        let target = encrypted_path(&normalize_path(&args.path)?);
        session.current_revision(&args.scope, &target).await?
    };

    let saved = session
        .save_file(&args.scope, &args.path, &plaintext, revision.as_ref())
        .await?;

    if !ctx.quiet() {
        println!("Saved {} in {}", saved.path, args.scope);
        println!("Revision: {}", saved.revision);
    }
    Ok(())
}

fn read_plaintext(file: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    if let Some(path) = file {
        return std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e));
    }
    if io::stdin().is_terminal() {
        eprintln!("Reading plaintext from stdin; finish with Ctrl-D.");
    }
    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
    Ok(buffer)
}
