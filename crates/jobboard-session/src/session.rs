use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use jobboard_core::endpoints::USERS_ME;
use jobboard_core::{ProfileUpdate, RegisterRequest, TokenPair, UserProfile};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth_client::{AuthClient, AuthGrant};
use crate::coordinator::RefreshCoordinator;
use crate::error::SessionError;
use crate::gateway::{ApiRequest, RequestGateway, DEFAULT_REFRESH_SKEW_SECONDS};
use crate::state::{AuthStatus, SessionState, SignOutReason};
use crate::store::TokenStore;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub base_url: String,
    /// Permit `http://` backends.
    pub allow_insecure: bool,
    pub refresh_skew: Option<ChronoDuration>,
}

impl SessionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            allow_insecure: false,
            refresh_skew: Some(ChronoDuration::seconds(DEFAULT_REFRESH_SKEW_SECONDS)),
        }
    }

    pub fn allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }
}

/// Owner of the session components; one per process.
pub struct Session {
    auth: AuthClient,
    store: Arc<TokenStore>,
    state: SessionState,
    gateway: RequestGateway,
}

impl Session {
    pub fn new(
        client: reqwest::Client,
        config: SessionConfig,
        store: TokenStore,
    ) -> Result<Self, SessionError> {
        if config.base_url.starts_with("http://") && !config.allow_insecure {
            return Err(SessionError::InsecureAddress(config.base_url));
        }
        let store = Arc::new(store);
        let state = SessionState::new();
        let auth = AuthClient::new(client.clone(), &config.base_url);
        let coordinator = RefreshCoordinator::new(auth.clone(), Arc::clone(&store), state.clone());
        let gateway = RequestGateway::new(client, &config.base_url, Arc::clone(&store), coordinator)
            .with_refresh_skew(config.refresh_skew);
        Ok(Self {
            auth,
            store,
            state,
            gateway,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        self.store.get()
    }

    /// Restores the session from stored credentials.
    ///
    /// Stored tokens are validated with `GET /users/me`, refreshing silently
    /// if needed. An expired session ends anonymous rather than failing.
    pub async fn bootstrap(&self) -> Result<AuthStatus, SessionError> {
        if self.store.get().is_none() {
            debug!("no stored credentials; starting anonymous");
            return Ok(AuthStatus::Anonymous);
        }
        match self.fetch_profile().await {
            Ok(_) => Ok(self.state.current()),
            Err(SessionError::SessionExpired) => {
                info!("stored session expired");
                self.expire();
                Ok(AuthStatus::Anonymous)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, SessionError> {
        let grant = self.auth.login(email, password).await?;
        self.commit(grant)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<UserProfile, SessionError> {
        let grant = self.auth.register(request).await?;
        self.commit(grant)
    }

    /// Best-effort backend logout followed by unconditional local teardown.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.store.refresh_token() {
            if let Err(err) = self.auth.logout(&refresh_token).await {
                warn!("backend logout failed; clearing local session anyway: {err}");
            }
        }
        self.teardown(SignOutReason::Logout);
    }

    /// Local teardown after a `SessionExpired` error.
    pub fn expire(&self) {
        self.teardown(SignOutReason::Expired);
    }

    pub async fn fetch_profile(&self) -> Result<UserProfile, SessionError> {
        let profile: UserProfile = self.gateway.send_json(&ApiRequest::get(USERS_ME)).await?;
        self.replace_profile(profile.clone());
        Ok(profile)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, SessionError> {
        let request = ApiRequest::patch(USERS_ME).with_json(serde_json::to_value(update)?);
        let profile: UserProfile = self.gateway.send_json(&request).await?;
        self.replace_profile(profile.clone());
        Ok(profile)
    }

    /// Convenience for business calls returning arbitrary JSON.
    pub async fn call(&self, request: &ApiRequest) -> Result<Value, SessionError> {
        self.gateway.send_value(request).await
    }

    fn commit(&self, grant: AuthGrant) -> Result<UserProfile, SessionError> {
        self.store.set(&grant.tokens)?;
        self.state.authenticate(grant.user.clone());
        Ok(grant.user)
    }

    fn replace_profile(&self, profile: UserProfile) {
        if self.store.get().is_some() {
            self.state.authenticate(profile);
        }
    }

    fn teardown(&self, reason: SignOutReason) {
        let _ = self.store.clear();
        self.state.sign_out(reason);
    }
}
