use jobboard_core::endpoints::EMPLOYERS;
use jobboard_session::ApiRequest;

use crate::cli_args::*;
use crate::modules::system::http::{path_with_id, print_json_call};
use crate::modules::system::CommandContext;

pub(crate) async fn handle_employer(
    args: EmployerArgs,
    ctx: &CommandContext<'_>,
) -> anyhow::Result<()> {
    match args.command {
        EmployerCommand::Get(args) => {
            let request = ApiRequest::get(path_with_id(EMPLOYERS, &args.id));
            print_json_call(ctx, request).await?;
        }
    }
    Ok(())
}
