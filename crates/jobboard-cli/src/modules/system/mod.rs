pub(crate) mod args;
pub(crate) mod config;
pub(crate) mod http;
pub(crate) mod types;

pub(crate) use config::{
    handle_config_command, load_config, open_token_store, remember_context, resolve_target,
    save_config,
};
pub(crate) use types::{CliConfig, CliContext, CommandContext, CredentialStoreKind, Target};
