use crate::cli::UnlockArgs;
use crate::context::AppContext;

/// Verify the passphrase. A one-shot process keeps nothing afterwards;
/// use `gitcloak shell` to stay unlocked.
pub async fn handle_unlock(ctx: &AppContext<'_>, args: &UnlockArgs) -> anyhow::Result<()> {
    let session = ctx.session()?;
    session.unlock_with_prompt(&args.scope).await?;

    if !ctx.quiet() {
        println!("Passphrase verified for {}", args.scope);
    }
    Ok(())
}
