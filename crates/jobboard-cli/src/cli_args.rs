use clap::{ArgAction, Parser, Subcommand};

pub use crate::modules::auth::args::*;
pub use crate::modules::employers::args::*;
pub use crate::modules::progress::args::*;
pub use crate::modules::system::args::*;
pub use crate::modules::users::args::*;
pub use crate::modules::vacancies::args::*;
use crate::modules::system::CredentialStoreKind;

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Job board CLI")]
#[command(version)]
pub struct Cli {
    #[arg(long, env = "JOBBOARD_ADDR")]
    pub addr: Option<String>,
    #[arg(long)]
    pub context: Option<String>,
    #[arg(long, env = "JOBBOARD_CREDENTIAL_STORE", value_enum)]
    pub credential_store: Option<CredentialStoreKind>,
    #[arg(long, env = "JOBBOARD_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    #[arg(long, help = "Allow http:// and invalid TLS certificates")]
    pub insecure: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Create an account and sign in")]
    Register(RegisterArgs),
    Login(LoginArgs),
    Logout,
    #[command(about = "Restore the stored session and report it")]
    Status,
    Whoami,
    Profile(ProfileArgs),
    Vacancies(VacancyArgs),
    Employers(EmployerArgs),
    Progress(ProgressArgs),
    Config(ConfigArgs),
}
