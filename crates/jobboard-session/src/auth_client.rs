use jobboard_core::endpoints::{AUTH_LOGIN, AUTH_LOGOUT, AUTH_REFRESH, AUTH_REGISTER};
use jobboard_core::{AuthPayload, Envelope, ErrorBody, LoginRequest, RegisterRequest};
use jobboard_core::{TokenPair, UserProfile};
use reqwest::StatusCode;
use tracing::debug;

use crate::error::SessionError;

/// Tokens and profile returned by a successful auth exchange.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub tokens: TokenPair,
    pub user: UserProfile,
}

/// Request/response boundary for the `/auth/*` endpoints.
///
/// Never reads or writes the token store or the session state; callers
/// commit the results.
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthGrant, SessionError> {
        debug!(email = %request.email, "register");
        let response = self
            .client
            .post(self.url(AUTH_REGISTER))
            .json(request)
            .send()
            .await?;
        read_grant(response, |status, body| match status {
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                SessionError::Validation(ErrorBody::message_from(&body))
            }
            status => SessionError::UnexpectedStatus { status, body },
        })
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, SessionError> {
        debug!(email = %email, "login");
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(self.url(AUTH_LOGIN))
            .json(&payload)
            .send()
            .await?;
        read_grant(response, |status, body| match status {
            StatusCode::BAD_REQUEST
            | StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::UNPROCESSABLE_ENTITY => SessionError::InvalidCredentials,
            status => SessionError::UnexpectedStatus { status, body },
        })
        .await
    }

    /// Exchanges the refresh token, sent as the bearer credential, for a new
    /// pair. `RefreshRejected` is terminal.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthGrant, SessionError> {
        debug!("refresh token exchange");
        let response = self
            .client
            .post(self.url(AUTH_REFRESH))
            .bearer_auth(refresh_token)
            .send()
            .await?;
        read_grant(response, |status, body| match status {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                SessionError::RefreshRejected
            }
            status => SessionError::UnexpectedStatus { status, body },
        })
        .await
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<(), SessionError> {
        debug!("logout");
        let response = self
            .client
            .post(self.url(AUTH_LOGOUT))
            .bearer_auth(refresh_token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::UnexpectedStatus { status, body });
        }
        Ok(())
    }
}

async fn read_grant(
    response: reqwest::Response,
    classify: impl FnOnce(StatusCode, String) -> SessionError,
) -> Result<AuthGrant, SessionError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        debug!(status = %status, "auth request rejected");
        return Err(classify(status, body));
    }
    let envelope: Envelope<AuthPayload> = serde_json::from_str(&body)?;
    let (tokens, user) = envelope.into_inner().into_parts();
    Ok(AuthGrant { tokens, user })
}
