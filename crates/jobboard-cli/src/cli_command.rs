use crate::cli_args::*;
use crate::modules::employers::handle_employer;
use crate::modules::progress::handle_progress;
use crate::modules::system::CommandContext;
use crate::modules::users::{handle_profile, handle_whoami};
use crate::modules::vacancies::handle_vacancy;

pub(crate) async fn handle_command(
    command: Command,
    ctx: &CommandContext<'_>,
) -> anyhow::Result<()> {
    match command {
        Command::Whoami => handle_whoami(ctx).await?,
        Command::Profile(args) => handle_profile(args, ctx).await?,
        Command::Vacancies(args) => handle_vacancy(args, ctx).await?,
        Command::Employers(args) => handle_employer(args, ctx).await?,
        Command::Progress(args) => handle_progress(args, ctx).await?,
        Command::Config(_)
        | Command::Register(_)
        | Command::Login(_)
        | Command::Logout
        | Command::Status => {
            unreachable!()
        }
    }

    Ok(())
}
