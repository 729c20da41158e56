use clap::{Args, Subcommand};

#[derive(Args)]
pub struct VacancyArgs {
    #[command(subcommand)]
    pub command: VacancyCommand,
}

#[derive(Subcommand)]
pub enum VacancyCommand {
    #[command(about = "Search vacancies")]
    List(VacancyListArgs),
    #[command(about = "Show one vacancy")]
    Get(VacancyGetArgs),
}

#[derive(Args)]
pub struct VacancyListArgs {
    #[arg(long, help = "Free-text search")]
    pub text: Option<String>,
    #[arg(long)]
    pub area: Option<String>,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub per_page: Option<u32>,
}

#[derive(Args)]
pub struct VacancyGetArgs {
    pub id: String,
}
