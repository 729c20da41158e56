use jobboard_core::ProgressCreate;

use super::http::{create_progress, delete_progress, list_progress};
use crate::cli_args::*;
use crate::modules::system::http::{ensure_logged_in, print_empty_call, print_json_call};
use crate::modules::system::CommandContext;

pub(crate) async fn handle_progress(
    args: ProgressArgs,
    ctx: &CommandContext<'_>,
) -> anyhow::Result<()> {
    ensure_logged_in(ctx)?;
    match args.command {
        ProgressCommand::List => {
            print_json_call(ctx, list_progress()).await?;
        }
        ProgressCommand::Set(args) => {
            let payload = ProgressCreate {
                vacancy_id: args.vacancy_id,
                status: args.status,
            };
            print_json_call(ctx, create_progress(&payload)?).await?;
        }
        ProgressCommand::Remove(args) => {
            print_empty_call(ctx, delete_progress(&args.id), "Progress entry removed").await?;
        }
    }
    Ok(())
}
