use clap::{Args, Subcommand};

use super::types::CredentialStoreKind;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Create or update a context")]
    SetContext(SetContextArgs),
    #[command(about = "Set the active context")]
    UseContext(UseContextArgs),
    #[command(about = "Print the active context name")]
    CurrentContext,
    #[command(about = "List known context names")]
    GetContexts,
}

#[derive(Args)]
pub struct SetContextArgs {
    pub name: String,
    #[arg(long)]
    pub addr: Option<String>,
    #[arg(long, value_enum)]
    pub credential_store: Option<CredentialStoreKind>,
}

#[derive(Args)]
pub struct UseContextArgs {
    pub name: String,
}
