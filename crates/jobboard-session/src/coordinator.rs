use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use jobboard_core::TokenPair;
use tracing::{info, warn};

use crate::auth_client::AuthClient;
use crate::error::SessionError;
use crate::state::{SessionState, SignOutReason};
use crate::store::TokenStore;

/// Terminal outcome of a refresh attempt, delivered identically to every
/// waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshFailure {
    #[error("refresh token rejected")]
    Rejected,
    #[error("no refresh token stored")]
    MissingRefreshToken,
    #[error("network error during refresh: {0}")]
    Network(String),
    #[error("unexpected refresh response: {0}")]
    Unexpected(String),
    #[error("failed to store refreshed tokens: {0}")]
    Storage(String),
    /// A logout or new sign-in happened while the exchange was in flight.
    #[error("session changed during refresh")]
    Superseded,
}

impl From<SessionError> for RefreshFailure {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::RefreshRejected => RefreshFailure::Rejected,
            SessionError::Network(err) => RefreshFailure::Network(err.to_string()),
            SessionError::Storage(err) => RefreshFailure::Storage(err.to_string()),
            other => RefreshFailure::Unexpected(other.to_string()),
        }
    }
}

pub type RefreshOutcome = Result<TokenPair, RefreshFailure>;
type PendingRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Single-flight guard around the refresh exchange.
///
/// Idle when the slot is empty, Refreshing while it holds the shared
/// outcome. The slot is filled under the lock before the exchange is first
/// polled, so two callers can never both observe Idle and start an exchange.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    auth: AuthClient,
    store: Arc<TokenStore>,
    state: SessionState,
    in_flight: Mutex<Option<PendingRefresh>>,
    exchanges: AtomicU64,
}

enum Ticket {
    Ready(TokenPair),
    Pending(PendingRefresh),
}

impl RefreshCoordinator {
    pub fn new(auth: AuthClient, store: Arc<TokenStore>, state: SessionState) -> Self {
        Self {
            inner: Arc::new(Inner {
                auth,
                store,
                state,
                in_flight: Mutex::new(None),
                exchanges: AtomicU64::new(0),
            }),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of refresh exchanges started since construction.
    pub fn exchanges_started(&self) -> u64 {
        self.inner.exchanges.load(Ordering::SeqCst)
    }

    /// Returns a token pair that supersedes `rejected`, the access token the
    /// caller was refused with (or `None` if it sent none).
    ///
    /// Joins the in-flight attempt when there is one. When Idle and the store
    /// already holds a different access token, that pair is returned as is.
    pub async fn request_valid_token(&self, rejected: Option<&str>) -> RefreshOutcome {
        match self.join_or_start(rejected) {
            Ticket::Ready(pair) => Ok(pair),
            Ticket::Pending(pending) => pending.await,
        }
    }

    fn join_or_start(&self, rejected: Option<&str>) -> Ticket {
        let mut slot = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = slot.as_ref() {
            return Ticket::Pending(pending.clone());
        }
        if let Some(pair) = self.inner.store.get() {
            if rejected != Some(pair.access_token.as_str()) {
                return Ticket::Ready(pair);
            }
        }

        let attempt = self.inner.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = Arc::clone(&self.inner);
        let pending = async move { inner.run(attempt).await }.boxed().shared();
        *slot = Some(pending.clone());
        Ticket::Pending(pending)
    }
}

impl Inner {
    async fn run(self: Arc<Self>, attempt: u64) -> RefreshOutcome {
        let (pair, generation) = self.store.snapshot();
        info!(attempt, "refreshing access token");
        let outcome = self.exchange(pair, generation).await;
        match &outcome {
            Ok(_) => info!(attempt, "access token refreshed"),
            Err(RefreshFailure::Superseded) => {
                info!(attempt, "session changed during refresh; result discarded");
            }
            Err(failure) => {
                warn!(attempt, "token refresh failed: {failure}");
                if self.store.clear_if_generation(generation) {
                    self.state.sign_out(SignOutReason::RefreshFailed);
                }
            }
        }
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        outcome
    }

    /// Exchanges the refresh token of `pair` and commits the result only if
    /// the store is still at `generation`.
    async fn exchange(&self, pair: Option<TokenPair>, generation: u64) -> RefreshOutcome {
        let refresh_token = pair
            .map(|pair| pair.refresh_token)
            .ok_or(RefreshFailure::MissingRefreshToken)?;
        let grant = self.auth.refresh(&refresh_token).await?;
        let user = grant.user;
        let committed = self
            .store
            .set_if_generation(&grant.tokens, generation, || {
                self.state.authenticate(user)
            })
            .map_err(|err| RefreshFailure::Storage(err.to_string()))?;
        if !committed {
            return Err(RefreshFailure::Superseded);
        }
        Ok(grant.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AuthStatus, SessionEvent};
    use futures::future::join_all;
    use jobboard_core::UserProfile;
    use mockito::Server;
    use serde_json::json;
    use std::io::Write;

    fn profile() -> UserProfile {
        UserProfile {
            id: "u-1".to_string(),
            email: "jane@example.com".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
        }
    }

    fn grant_body(access: &str, refresh: &str) -> String {
        json!({
            "data": {
                "accessToken": access,
                "refreshToken": refresh,
                "user": profile()
            }
        })
        .to_string()
    }

    fn build(
        url: &str,
        pair: Option<TokenPair>,
    ) -> (RefreshCoordinator, Arc<TokenStore>, SessionState) {
        let store = Arc::new(TokenStore::in_memory());
        if let Some(pair) = pair {
            store.set(&pair).expect("seed store");
        }
        let state = SessionState::new();
        let coordinator = RefreshCoordinator::new(
            AuthClient::new(reqwest::Client::new(), url),
            Arc::clone(&store),
            state.clone(),
        );
        (coordinator, store, state)
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_exchange() {
        let mut server = Server::new_async().await;
        let refresh = server
            .mock("POST", "/auth/refresh")
            .match_header("authorization", "Bearer refresh-1")
            .with_status(200)
            .with_body(grant_body("access-2", "refresh-2"))
            .expect(1)
            .create_async()
            .await;

        let (coordinator, store, state) =
            build(&server.url(), Some(TokenPair::new("access-1", "refresh-1")));

        let outcomes =
            join_all((0..8).map(|_| coordinator.request_valid_token(Some("access-1")))).await;

        for outcome in outcomes {
            assert_eq!(outcome, Ok(TokenPair::new("access-2", "refresh-2")));
        }
        refresh.assert_async().await;
        assert_eq!(coordinator.exchanges_started(), 1);
        assert!(!coordinator.is_refreshing());
        assert_eq!(store.get(), Some(TokenPair::new("access-2", "refresh-2")));
        assert_eq!(state.current(), AuthStatus::Authenticated(profile()));
    }

    #[tokio::test]
    async fn late_caller_with_stale_token_reuses_new_pair() {
        let mut server = Server::new_async().await;
        let refresh = server
            .mock("POST", "/auth/refresh")
            .with_status(200)
            .with_body(grant_body("access-2", "refresh-2"))
            .expect(1)
            .create_async()
            .await;

        let (coordinator, _store, _state) =
            build(&server.url(), Some(TokenPair::new("access-1", "refresh-1")));

        let first = coordinator.request_valid_token(Some("access-1")).await;
        let late = coordinator.request_valid_token(Some("access-1")).await;

        assert_eq!(first, late);
        refresh.assert_async().await;
        assert_eq!(coordinator.exchanges_started(), 1);
    }

    #[tokio::test]
    async fn idle_again_after_resolution() {
        let mut server = Server::new_async().await;
        let refresh = server
            .mock("POST", "/auth/refresh")
            .with_status(200)
            .with_body(grant_body("access-2", "refresh-2"))
            .expect(2)
            .create_async()
            .await;

        let (coordinator, _store, _state) =
            build(&server.url(), Some(TokenPair::new("access-1", "refresh-1")));

        coordinator
            .request_valid_token(Some("access-1"))
            .await
            .expect("first refresh");
        coordinator
            .request_valid_token(Some("access-2"))
            .await
            .expect("second refresh");

        refresh.assert_async().await;
        assert_eq!(coordinator.exchanges_started(), 2);
    }

    #[tokio::test]
    async fn rejection_clears_store_and_signs_out_once() {
        let mut server = Server::new_async().await;
        let refresh = server
            .mock("POST", "/auth/refresh")
            .with_status(401)
            .with_body(r#"{"message":"Refresh token expired"}"#)
            .expect(1)
            .create_async()
            .await;

        let (coordinator, store, state) =
            build(&server.url(), Some(TokenPair::new("access-1", "refresh-1")));
        state.authenticate(profile());
        let mut events = state.subscribe();

        let outcomes =
            join_all((0..5).map(|_| coordinator.request_valid_token(Some("access-1")))).await;

        for outcome in outcomes {
            assert_eq!(outcome, Err(RefreshFailure::Rejected));
        }
        refresh.assert_async().await;
        assert!(store.get().is_none());
        assert_eq!(state.current(), AuthStatus::Anonymous);
        assert_eq!(
            events.try_recv().expect("event"),
            SessionEvent::SignedOut(SignOutReason::RefreshFailed)
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn missing_refresh_token_fails_without_exchange() {
        let mut server = Server::new_async().await;
        let refresh = server
            .mock("POST", "/auth/refresh")
            .expect(0)
            .create_async()
            .await;

        let (coordinator, store, state) = build(&server.url(), None);

        let outcome = coordinator.request_valid_token(None).await;

        assert_eq!(outcome, Err(RefreshFailure::MissingRefreshToken));
        refresh.assert_async().await;
        assert!(store.get().is_none());
        assert!(!state.is_authenticated());
    }

    #[tokio::test]
    async fn transport_failure_is_a_terminal_outcome() {
        let (coordinator, store, _state) = build(
            "http://127.0.0.1:9",
            Some(TokenPair::new("access-1", "refresh-1")),
        );

        let outcome = coordinator.request_valid_token(Some("access-1")).await;

        assert!(matches!(outcome, Err(RefreshFailure::Network(_))));
        assert!(store.get().is_none());
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn logout_during_refresh_discards_the_new_pair() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/refresh")
            .with_status(200)
            .with_chunked_body(|writer| {
                std::thread::sleep(std::time::Duration::from_millis(300));
                writer.write_all(grant_body("access-2", "refresh-2").as_bytes())
            })
            .create_async()
            .await;

        let (coordinator, store, state) =
            build(&server.url(), Some(TokenPair::new("access-1", "refresh-1")));
        state.authenticate(profile());

        let pending = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.request_valid_token(Some("access-1")).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        store.clear().expect("clear");
        state.sign_out(SignOutReason::Logout);

        let outcome = pending.await.expect("join");

        assert_eq!(outcome, Err(RefreshFailure::Superseded));
        assert!(store.get().is_none());
        assert_eq!(state.current(), AuthStatus::Anonymous);
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failed_refresh_keeps_a_newer_sign_in() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/refresh")
            .with_status(401)
            .with_chunked_body(|_| {
                std::thread::sleep(std::time::Duration::from_millis(300));
                Ok(())
            })
            .create_async()
            .await;

        let (coordinator, store, state) =
            build(&server.url(), Some(TokenPair::new("access-1", "refresh-1")));

        let pending = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.request_valid_token(Some("access-1")).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        store
            .set(&TokenPair::new("access-9", "refresh-9"))
            .expect("sign in");
        state.authenticate(profile());

        let outcome = pending.await.expect("join");

        assert_eq!(outcome, Err(RefreshFailure::Rejected));
        assert_eq!(store.get(), Some(TokenPair::new("access-9", "refresh-9")));
        assert!(state.is_authenticated());
    }
}
