use clap::Args;

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long, help = "Prompted when omitted")]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long, help = "Prompted when omitted")]
    pub email: Option<String>,
    #[arg(long, help = "Prompted when omitted")]
    pub password: Option<String>,
}
