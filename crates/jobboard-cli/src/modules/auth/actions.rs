use jobboard_core::{RegisterRequest, UserProfile};
use jobboard_session::{AuthStatus, Session};

use crate::cli_args::{LoginArgs, RegisterArgs};
use crate::modules::system::{remember_context, CliConfig, Target};
use crate::{prompt_line, prompt_password};

pub(crate) async fn handle_register(
    args: RegisterArgs,
    session: &Session,
    target: &Target,
    config: &mut CliConfig,
) -> anyhow::Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };
    let request = RegisterRequest {
        email: args.email,
        password,
        first_name: args.first_name,
        last_name: args.last_name,
    };
    let profile = session.register(&request).await?;
    remember_context(config, target);
    print_signed_in("Registered", &profile, target);
    Ok(())
}

pub(crate) async fn handle_login(
    args: LoginArgs,
    session: &Session,
    target: &Target,
    config: &mut CliConfig,
) -> anyhow::Result<()> {
    let email = match args.email {
        Some(email) => email,
        None => prompt_line("Email: ")?,
    };
    if email.trim().is_empty() {
        anyhow::bail!("email is required");
    }
    let password = match args.password {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };
    let profile = session.login(email.trim(), &password).await?;
    remember_context(config, target);
    print_signed_in("Logged in", &profile, target);
    Ok(())
}

pub(crate) async fn handle_logout(session: &Session, target: &Target) -> anyhow::Result<()> {
    if session.tokens().is_none() {
        println!("Not logged in");
        return Ok(());
    }
    session.logout().await;
    println!("Logged out of {}", target.context_name);
    Ok(())
}

pub(crate) async fn handle_status(session: &Session, target: &Target) -> anyhow::Result<()> {
    match session.bootstrap().await? {
        AuthStatus::Anonymous => println!("anonymous ({})", target.context_name),
        AuthStatus::Authenticated(profile) => println!(
            "authenticated as {} <{}> ({})",
            profile.display_name(),
            profile.email,
            target.context_name
        ),
    }
    Ok(())
}

fn print_signed_in(verb: &str, profile: &UserProfile, target: &Target) {
    println!(
        "{verb} as {} <{}> ({})",
        profile.display_name(),
        profile.email,
        target.context_name
    );
}
