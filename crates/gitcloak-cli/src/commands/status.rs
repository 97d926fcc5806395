use gitcloak_core::ScopeState;

use crate::cli::StatusArgs;
use crate::context::AppContext;
use crate::render::status_json;

pub async fn handle_status(ctx: &AppContext<'_>, args: &StatusArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let state = session.scope_state(&args.scope).await?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status_json(&args.scope, state))?
        );
        return Ok(());
    }

    println!("{}: {}", args.scope, state);
    if state == ScopeState::NoArtifact && !ctx.quiet() {
        eprintln!("Hint: The first save into {} sets its passphrase.", args.scope);
    }
    Ok(())
}
