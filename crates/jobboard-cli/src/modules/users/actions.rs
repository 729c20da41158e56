use jobboard_core::ProfileUpdate;

use crate::cli_args::*;
use crate::modules::system::http::{ensure_logged_in, print_json};
use crate::modules::system::CommandContext;

pub(crate) async fn handle_whoami(ctx: &CommandContext<'_>) -> anyhow::Result<()> {
    ensure_logged_in(ctx)?;
    let profile = ctx.session.fetch_profile().await?;
    print_json(serde_json::to_value(profile)?)
}

pub(crate) async fn handle_profile(
    args: ProfileArgs,
    ctx: &CommandContext<'_>,
) -> anyhow::Result<()> {
    match args.command {
        ProfileCommand::Update(args) => {
            ensure_logged_in(ctx)?;
            let update = ProfileUpdate {
                first_name: args.first_name,
                last_name: args.last_name,
            };
            if update.is_empty() {
                anyhow::bail!("nothing to update; pass --first-name or --last-name");
            }
            let profile = ctx.session.update_profile(&update).await?;
            print_json(serde_json::to_value(profile)?)?;
        }
    }
    Ok(())
}
