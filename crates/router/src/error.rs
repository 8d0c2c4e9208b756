use thiserror::Error;
use wallet_actions_session::SessionError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    #[error("no viable route found")]
    NoViableRoute,

    #[error("deadline {deadline} passed (now {now})")]
    DeadlineExceeded { deadline: u64, now: u64 },

    #[error("invalid route request: {reason}")]
    InvalidRequest { reason: String },

    #[error("user rejected the request")]
    UserRejected,

    #[error("planner query failed: {0}")]
    Transport(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SessionError> for PlanningError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UserRejected => PlanningError::UserRejected,
            other => PlanningError::Transport(other.to_string()),
        }
    }
}
