use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("refresh token rejected")]
    RefreshRejected,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("session expired")]
    SessionExpired,
    #[error("unexpected response: {status} {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("token storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("refusing to use http:// without --insecure: {0}")]
    InsecureAddress(String),
}

impl SessionError {
    /// Consumers treat this uniformly as "return to the anonymous state".
    pub fn is_session_expired(&self) -> bool {
        matches!(self, SessionError::SessionExpired)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credential file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed credential file {path}: {source}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("keyring: {0}")]
    Keyring(String),
}
