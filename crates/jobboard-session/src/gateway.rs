use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration as ChronoDuration, Utc};
use jobboard_core::endpoints::AUTH_PREFIX;
use jobboard_core::{expires_within, Envelope, TokenPair};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::coordinator::RefreshCoordinator;
use crate::error::SessionError;
use crate::store::TokenStore;

pub const DEFAULT_REFRESH_SKEW_SECONDS: i64 = 30;

/// A request that can be replayed after a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, params: Vec<(String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn is_auth_call(&self) -> bool {
        self.path.starts_with(AUTH_PREFIX)
    }
}

/// Chokepoint for every business call: attaches the access token and turns
/// a 401 into one refresh plus one retry.
#[derive(Clone)]
pub struct RequestGateway {
    client: reqwest::Client,
    base_url: String,
    store: Arc<TokenStore>,
    coordinator: RefreshCoordinator,
    refresh_skew: Option<ChronoDuration>,
}

impl RequestGateway {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        store: Arc<TokenStore>,
        coordinator: RefreshCoordinator,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            coordinator,
            refresh_skew: Some(ChronoDuration::seconds(DEFAULT_REFRESH_SKEW_SECONDS)),
        }
    }

    /// `None` disables renewal of JWT access tokens that are about to expire.
    pub fn with_refresh_skew(mut self, skew: Option<ChronoDuration>) -> Self {
        self.refresh_skew = skew;
        self
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response, SessionError> {
        let mut token = self.store.access_token();
        if request.is_auth_call() {
            return self.send_once(request, token.as_deref()).await;
        }

        let refreshed = token.as_deref().is_some_and(|token| self.expiring(token));
        if refreshed {
            debug!(path = %request.path, "access token about to expire; renewing first");
            let pair = self.renew(token.as_deref()).await?;
            token = Some(pair.access_token);
        }

        let response = self.send_once(request, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        if refreshed {
            warn!(path = %request.path, "freshly renewed access token rejected");
            return Err(SessionError::SessionExpired);
        }

        info!(
            method = %request.method,
            path = %request.path,
            "http request unauthorized; attempting token refresh"
        );
        let pair = self.renew(token.as_deref()).await?;
        let retried = self.send_once(request, Some(&pair.access_token)).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %request.path, "request still unauthorized after refresh");
            return Err(SessionError::SessionExpired);
        }
        Ok(retried)
    }

    /// Sends the request and decodes the `data` member of a success body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<T, SessionError> {
        let body = self.send_checked(request).await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.into_inner())
    }

    /// Sends the request and returns the whole JSON body (`Null` when empty).
    pub async fn send_value(&self, request: &ApiRequest) -> Result<Value, SessionError> {
        let body = self.send_checked(request).await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_checked(&self, request: &ApiRequest) -> Result<String, SessionError> {
        let response = self.send(request).await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SessionError::UnexpectedStatus { status, body });
        }
        Ok(body)
    }

    fn expiring(&self, token: &str) -> bool {
        self.refresh_skew
            .map(|skew| expires_within(token, skew, Utc::now()))
            .unwrap_or(false)
    }

    async fn renew(&self, rejected: Option<&str>) -> Result<TokenPair, SessionError> {
        self.coordinator
            .request_valid_token(rejected)
            .await
            .map_err(|failure| {
                info!("session expired: {failure}");
                SessionError::SessionExpired
            })
    }

    async fn send_once(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<reqwest::Response, SessionError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        debug!(method = %request.method, url = %url, "http request");
        let start = Instant::now();
        let response = builder.send().await?;
        debug!(
            method = %request.method,
            url = %url,
            status = %response.status(),
            elapsed_ms = start.elapsed().as_millis(),
            "http response"
        );
        Ok(response)
    }
}
