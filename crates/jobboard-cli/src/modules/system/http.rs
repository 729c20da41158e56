use jobboard_core::unwrap_data;
use jobboard_session::ApiRequest;
use serde_json::Value;

use crate::modules::system::CommandContext;

/// Sends a business call and prints its payload without the `data` envelope.
pub(crate) async fn print_json_call(
    ctx: &CommandContext<'_>,
    request: ApiRequest,
) -> anyhow::Result<()> {
    let body = ctx.session.call(&request).await?;
    print_json(unwrap_data(body))
}

pub(crate) async fn print_empty_call(
    ctx: &CommandContext<'_>,
    request: ApiRequest,
    message: &str,
) -> anyhow::Result<()> {
    ctx.session.call(&request).await?;
    println!("{message}");
    Ok(())
}

pub(crate) fn print_json(value: Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// Encodes one path segment taken from user input.
pub(crate) fn path_with_id(prefix: &str, id: &str) -> String {
    format!("{prefix}/{}", urlencoding::encode(id.trim()))
}

pub(crate) fn ensure_logged_in(ctx: &CommandContext<'_>) -> anyhow::Result<()> {
    if ctx.session.tokens().is_none() {
        anyhow::bail!(
            "not logged in to context '{}'; run `jobboard login`",
            ctx.context_name
        );
    }
    Ok(())
}
