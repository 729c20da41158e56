use clap::ValueEnum;
use jobboard_session::Session;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default)]
    pub current_context: Option<String>,
    #[serde(default)]
    pub contexts: HashMap<String, CliContext>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct CliContext {
    pub addr: String,
    #[serde(default)]
    pub credential_store: Option<CredentialStoreKind>,
}

/// Where a context keeps its token pair.
#[derive(Serialize, Deserialize, ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStoreKind {
    #[default]
    Keyring,
    File,
}

/// Resolved target of one invocation.
pub struct Target {
    pub context_name: String,
    pub addr: String,
    pub credential_store: CredentialStoreKind,
}

pub struct CommandContext<'a> {
    pub session: &'a Session,
    pub context_name: &'a str,
}
