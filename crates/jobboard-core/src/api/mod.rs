pub mod auth;
pub mod envelope;
pub mod jobs;

pub use auth::*;
pub use envelope::*;
pub use jobs::*;
