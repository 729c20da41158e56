use std::fs;
use std::path::{Path, PathBuf};

use jobboard_session::{FileBackend, KeyringBackend, TokenStore};

use super::types::{CliConfig, CliContext, CredentialStoreKind, Target};
use crate::cli_args::{ConfigArgs, ConfigCommand};
use crate::{DEFAULT_ADDR, DEFAULT_CONTEXT};

pub(crate) fn handle_config_command(
    args: ConfigArgs,
    config: &mut CliConfig,
) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::SetContext(args) => {
            let entry = config
                .contexts
                .entry(args.name.clone())
                .or_insert_with(|| CliContext {
                    addr: DEFAULT_ADDR.to_string(),
                    credential_store: None,
                });
            if let Some(addr) = args.addr {
                entry.addr = addr;
            }
            if let Some(store) = args.credential_store {
                entry.credential_store = Some(store);
            }
            config.current_context = Some(args.name);
        }
        ConfigCommand::UseContext(args) => {
            if !config.contexts.contains_key(&args.name) {
                anyhow::bail!("context not found: {}", args.name);
            }
            config.current_context = Some(args.name);
        }
        ConfigCommand::CurrentContext => {
            if let Some(current) = config.current_context.clone() {
                println!("{current}");
            }
        }
        ConfigCommand::GetContexts => {
            let mut names: Vec<_> = config.contexts.keys().cloned().collect();
            names.sort();
            for name in names {
                let marker = if config.current_context.as_ref() == Some(&name) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {name}");
            }
        }
    }
    Ok(())
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("HOME is not set"))?;
    Ok(Path::new(&home).join(".jobboard"))
}

fn config_path() -> anyhow::Result<PathBuf> {
    Ok(home_dir()?.join("config.json"))
}

pub(crate) fn credentials_path(context_name: &str) -> anyhow::Result<PathBuf> {
    Ok(home_dir()?
        .join("credentials")
        .join(format!("{context_name}.json")))
}

pub(crate) fn load_config() -> anyhow::Result<CliConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    let config = serde_json::from_str(&contents)?;
    Ok(config)
}

pub(crate) fn save_config(config: &CliConfig) -> anyhow::Result<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Flags win over the stored context, which wins over built-in defaults.
pub(crate) fn resolve_target(
    addr_arg: Option<String>,
    context_arg: Option<String>,
    store_arg: Option<CredentialStoreKind>,
    config: &CliConfig,
) -> Target {
    let context_name = context_arg
        .or_else(|| config.current_context.clone())
        .unwrap_or_else(|| DEFAULT_CONTEXT.to_string());
    let context = config.contexts.get(&context_name);
    let addr = addr_arg
        .or_else(|| context.map(|ctx| ctx.addr.clone()))
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());
    let credential_store = store_arg
        .or_else(|| context.and_then(|ctx| ctx.credential_store))
        .unwrap_or_default();
    Target {
        context_name,
        addr,
        credential_store,
    }
}

/// Records a successful sign-in against its context and makes it current.
pub(crate) fn remember_context(config: &mut CliConfig, target: &Target) {
    let entry = config
        .contexts
        .entry(target.context_name.clone())
        .or_insert_with(|| CliContext {
            addr: target.addr.clone(),
            credential_store: None,
        });
    entry.addr = target.addr.clone();
    entry.credential_store = Some(target.credential_store);
    config.current_context = Some(target.context_name.clone());
}

pub(crate) fn open_token_store(target: &Target) -> anyhow::Result<TokenStore> {
    let store = match target.credential_store {
        CredentialStoreKind::File => {
            TokenStore::open(FileBackend::new(credentials_path(&target.context_name)?))?
        }
        CredentialStoreKind::Keyring => {
            TokenStore::open(KeyringBackend::new(&target.context_name))?
        }
    };
    Ok(store)
}
