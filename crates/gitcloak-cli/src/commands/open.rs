use std::io::{self, Write};

use crate::cli::OpenArgs;
use crate::context::AppContext;

pub async fn handle_open(ctx: &AppContext<'_>, args: &OpenArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let loaded = session.load_file(&args.scope, &args.path).await?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &loaded.content)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
            if !ctx.quiet() {
                eprintln!("Wrote {} to {}", loaded.path, path.display());
            }
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&loaded.content)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
