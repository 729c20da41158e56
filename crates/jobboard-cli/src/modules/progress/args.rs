use clap::{Args, Subcommand};
use jobboard_core::ProgressStatus;

#[derive(Args)]
pub struct ProgressArgs {
    #[command(subcommand)]
    pub command: ProgressCommand,
}

#[derive(Subcommand)]
pub enum ProgressCommand {
    #[command(about = "List tracked vacancies")]
    List,
    #[command(about = "Track a vacancy with a status")]
    Set(ProgressSetArgs),
    #[command(about = "Stop tracking an entry")]
    Remove(ProgressRemoveArgs),
}

#[derive(Args)]
pub struct ProgressSetArgs {
    pub vacancy_id: String,
    #[arg(long, help = "saved, applied, interview, offer or rejected")]
    pub status: ProgressStatus,
}

#[derive(Args)]
pub struct ProgressRemoveArgs {
    pub id: String,
}
