use thiserror::Error;

/// Failures reported by the wallet transport or its collaborators
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("user rejected the request")]
    UserRejected,

    #[error("no active wallet session")]
    Unavailable,

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("capability not supported: {0}")]
    Unsupported(String),

    #[error("transport error: {0}")]
    Transport(String),
}
