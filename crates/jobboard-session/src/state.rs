use jobboard_core::UserProfile;
use tokio::sync::{broadcast, watch};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    Authenticated(UserProfile),
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated(_))
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            AuthStatus::Authenticated(profile) => Some(profile),
            AuthStatus::Anonymous => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    Logout,
    /// Local teardown by a consumer that received `SessionExpired`.
    Expired,
    RefreshFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(UserProfile),
    SignedOut(SignOutReason),
}

const EVENT_CAPACITY: usize = 32;

/// Process-wide authenticated/anonymous flag and profile.
///
/// Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct SessionState {
    status: watch::Sender<AuthStatus>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionState {
    pub fn new() -> Self {
        let (status, _) = watch::channel(AuthStatus::Anonymous);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { status, events }
    }

    pub fn current(&self) -> AuthStatus {
        self.status.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status.borrow().is_authenticated()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.status.borrow().profile().cloned()
    }

    /// Receiver that always holds the latest status.
    pub fn watch(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }

    /// Stream of sign-in/sign-out transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Enters (or stays in) the authenticated state with `profile`, replacing
    /// any previous profile wholesale.
    pub fn authenticate(&self, profile: UserProfile) {
        let mut signed_in = false;
        self.status.send_if_modified(|status| {
            signed_in = !status.is_authenticated();
            let next = AuthStatus::Authenticated(profile.clone());
            if *status == next {
                return false;
            }
            *status = next;
            true
        });
        if signed_in {
            info!(user = %profile.id, "session authenticated");
            let _ = self.events.send(SessionEvent::SignedIn(profile));
        }
    }

    /// Returns whether this call performed the Authenticated -> Anonymous
    /// transition.
    pub fn sign_out(&self, reason: SignOutReason) -> bool {
        let changed = self.status.send_if_modified(|status| {
            if !status.is_authenticated() {
                return false;
            }
            *status = AuthStatus::Anonymous;
            true
        });
        if changed {
            info!(reason = ?reason, "session signed out");
            let _ = self.events.send(SessionEvent::SignedOut(reason));
        }
        changed
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
