use jobboard_core::VacancyQuery;

use super::http::{get_vacancy, list_vacancies};
use crate::cli_args::*;
use crate::modules::system::http::print_json_call;
use crate::modules::system::CommandContext;

pub(crate) async fn handle_vacancy(
    args: VacancyArgs,
    ctx: &CommandContext<'_>,
) -> anyhow::Result<()> {
    match args.command {
        VacancyCommand::List(args) => {
            let query = VacancyQuery {
                text: args.text,
                area: args.area,
                page: args.page,
                per_page: args.per_page,
            };
            print_json_call(ctx, list_vacancies(&query)).await?;
        }
        VacancyCommand::Get(args) => {
            print_json_call(ctx, get_vacancy(&args.id)).await?;
        }
    }
    Ok(())
}
