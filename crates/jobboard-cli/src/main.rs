use clap::Parser;
use jobboard_session::{Session, SessionConfig, SessionError};
use std::io::{self, Write};
use std::time::Duration;

mod cli_args;
mod cli_command;
mod modules;

use crate::cli_args::*;
use crate::cli_command::handle_command;
use crate::modules::auth::{handle_login, handle_logout, handle_register, handle_status};
use crate::modules::system::{
    handle_config_command, load_config, open_token_store, resolve_target, save_config,
    CommandContext,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub(crate) const DEFAULT_ADDR: &str = "https://127.0.0.1:8080";
pub(crate) const DEFAULT_CONTEXT: &str = "default";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let mut config = load_config()?;

    let command = match cli.command {
        Command::Config(args) => {
            handle_config_command(args, &mut config)?;
            save_config(&config)?;
            return Ok(());
        }
        command => command,
    };

    let target = resolve_target(cli.addr, cli.context, cli.credential_store, &config);
    debug!(
        context = %target.context_name,
        addr = %target.addr,
        store = ?target.credential_store,
        "resolved target"
    );
    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(cli.insecure)
        .timeout(Duration::from_secs(cli.timeout_secs))
        .build()?;
    let store = open_token_store(&target)?;
    let session = Session::new(
        client,
        SessionConfig::new(target.addr.clone()).allow_insecure(cli.insecure),
        store,
    )?;

    let result = match command {
        Command::Register(args) => {
            handle_register(args, &session, &target, &mut config).await?;
            save_config(&config)
        }
        Command::Login(args) => {
            handle_login(args, &session, &target, &mut config).await?;
            save_config(&config)
        }
        Command::Logout => handle_logout(&session, &target).await,
        Command::Status => handle_status(&session, &target).await,
        command => {
            let ctx = CommandContext {
                session: &session,
                context_name: &target.context_name,
            };
            handle_command(command, &ctx).await
        }
    };

    result.map_err(|err| expire_on_session_loss(err, &session))
}

/// Business calls report a lost session as `SessionExpired`; the stored
/// credentials are dropped before telling the user to sign in again.
fn expire_on_session_loss(err: anyhow::Error, session: &Session) -> anyhow::Error {
    let expired = err
        .downcast_ref::<SessionError>()
        .is_some_and(SessionError::is_session_expired);
    if !expired {
        return err;
    }
    session.expire();
    anyhow::anyhow!("session expired; run `jobboard login`")
}

fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter)?)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

pub(crate) fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    let mut input = String::new();
    print!("{prompt}");
    io::stdout().flush()?;
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub(crate) fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let password = rpassword::read_password()?;
    if password.trim().is_empty() {
        anyhow::bail!("password is required");
    }
    Ok(password)
}
