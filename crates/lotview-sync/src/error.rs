use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("router rejected {action}: {reason}")]
    Navigation {
        action: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage unavailable: {0}")]
    Unavailable(String),
}
