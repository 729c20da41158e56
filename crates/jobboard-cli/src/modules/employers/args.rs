use clap::{Args, Subcommand};

#[derive(Args)]
pub struct EmployerArgs {
    #[command(subcommand)]
    pub command: EmployerCommand,
}

#[derive(Subcommand)]
pub enum EmployerCommand {
    #[command(about = "Show one employer")]
    Get(EmployerGetArgs),
}

#[derive(Args)]
pub struct EmployerGetArgs {
    pub id: String,
}
