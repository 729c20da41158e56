#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

//! Authenticated-session lifecycle for the job-board API: credential
//! storage, the auth endpoints, single-flight silent refresh and the request
//! gateway every business call goes through.

pub mod auth_client;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod session;
pub mod state;
pub mod store;

pub use auth_client::AuthClient;
pub use coordinator::{RefreshCoordinator, RefreshFailure};
pub use error::{SessionError, StoreError};
pub use gateway::{ApiRequest, RequestGateway};
pub use session::{Session, SessionConfig};
pub use state::{AuthStatus, SessionEvent, SessionState, SignOutReason};
pub use store::{CredentialBackend, FileBackend, KeyringBackend, MemoryBackend, TokenStore};

pub use jobboard_core::{TokenPair, UserProfile};
