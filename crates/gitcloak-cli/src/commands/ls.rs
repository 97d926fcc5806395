use std::io::IsTerminal;

use crate::cli::LsArgs;
use crate::context::AppContext;
use crate::render::{listing_json, render_listing};

pub async fn handle_ls(ctx: &AppContext<'_>, args: &LsArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let listing = session.list(&args.scope, &args.dir).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&listing_json(&listing))?);
    } else if !listing.is_empty() {
        println!(
            "{}",
            render_listing(&listing, std::io::stdout().is_terminal())
        );
    } else if !ctx.quiet() {
        eprintln!("{} is empty", args.scope);
    }
    Ok(())
}
