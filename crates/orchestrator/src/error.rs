use thiserror::Error;
use wallet_actions_router::PlanningError;
use wallet_actions_session::SessionError;
use wallet_actions_types::{ActionError, ActionErrorKind, ActionPhase, BatchId, ChainId};

use crate::swap::SwapPhase;

/// Failure of a single wallet request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperationError {
    #[error("user rejected the request")]
    UserRejected,

    #[error("no connected account")]
    SessionUnavailable,

    #[error("wallet capability unsupported: {0}")]
    Unsupported(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl OperationError {
    pub fn kind(&self) -> ActionErrorKind {
        match self {
            OperationError::UserRejected => ActionErrorKind::UserRejected,
            OperationError::SessionUnavailable => ActionErrorKind::SessionUnavailable,
            OperationError::Unsupported(_) | OperationError::Transport(_) => {
                ActionErrorKind::TransportError
            }
            OperationError::InvalidRequest(_) => ActionErrorKind::InvalidRequest,
        }
    }

    /// Tag with the phase the failure originated in
    pub fn into_action_error(self, phase: ActionPhase) -> ActionError {
        ActionError::new(self.kind(), phase, self.to_string())
    }
}

impl From<SessionError> for OperationError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UserRejected => OperationError::UserRejected,
            SessionError::Unavailable => OperationError::SessionUnavailable,
            SessionError::Unsupported(what) => OperationError::Unsupported(what),
            SessionError::Timeout(msg) => OperationError::Transport(format!("timeout: {msg}")),
            SessionError::Transport(msg) => OperationError::Transport(msg),
        }
    }
}

/// The session could not be moved to the required chain
#[derive(Debug, Clone, PartialEq, Error)]
#[error("switch to chain {target} failed: {cause}")]
pub struct ChainSwitchError {
    pub target: ChainId,
    pub cause: SessionError,
}

impl From<ChainSwitchError> for ActionError {
    fn from(err: ChainSwitchError) -> Self {
        let kind = match err.cause {
            SessionError::Unavailable => ActionErrorKind::SessionUnavailable,
            _ => ActionErrorKind::ChainSwitchError,
        };
        ActionError::new(kind, ActionPhase::ChainSelection, err.to_string())
    }
}

/// Failure submitting or resolving an atomic batch
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BatchError {
    #[error("batch submission failed: {0}")]
    Submission(#[from] OperationError),

    #[error(
        "status of batch {batch_id} unresolved: wait failed ({wait_error}), \
         status query failed ({status_error})"
    )]
    Unresolved {
        batch_id: BatchId,
        call_count: usize,
        wait_error: SessionError,
        status_error: SessionError,
    },
}

impl From<BatchError> for ActionError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Submission(op) => op.into_action_error(ActionPhase::Submission),
            BatchError::Unresolved { ref batch_id, .. } => ActionError::new(
                ActionErrorKind::StatusUnresolved {
                    batch_id: batch_id.clone(),
                },
                ActionPhase::Resolution,
                err.to_string(),
            ),
        }
    }
}

/// Why a swap stopped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SwapErrorKind {
    #[error("no connected account")]
    SessionUnavailable,

    #[error("invalid swap request: {0}")]
    InvalidRequest(String),

    #[error("route planning failed: {0}")]
    Planning(PlanningError),

    #[error("deadline {deadline} passed (now {now})")]
    DeadlineExceeded { deadline: u64, now: u64 },

    #[error("{count} token approval(s) required and not handled")]
    UnhandledApprovals { count: usize },

    #[error("multicall execution failed: {0}")]
    Execution(PlanningError),

    #[error("swap batch submission failed: {0}")]
    Submission(OperationError),

    #[error("swap batch {batch_id} unresolved: {reason}")]
    BatchUnresolved {
        batch_id: BatchId,
        call_count: usize,
        reason: String,
    },

    #[error("swap batch {batch_id} failed on chain")]
    BatchFailed { batch_id: BatchId },
}

/// Swap failure tagged with the phase it happened in
#[derive(Debug, Clone, PartialEq, Error)]
#[error("swap failed during {phase}: {kind}")]
pub struct SwapError {
    pub phase: SwapPhase,
    pub kind: SwapErrorKind,
}

impl SwapError {
    pub fn new(phase: SwapPhase, kind: SwapErrorKind) -> Self {
        Self { phase, kind }
    }
}

impl From<SwapError> for ActionError {
    fn from(err: SwapError) -> Self {
        let kind = match &err.kind {
            SwapErrorKind::SessionUnavailable => ActionErrorKind::SessionUnavailable,
            SwapErrorKind::InvalidRequest(_) => ActionErrorKind::InvalidRequest,
            SwapErrorKind::DeadlineExceeded { .. }
            | SwapErrorKind::Planning(PlanningError::DeadlineExceeded { .. })
            | SwapErrorKind::Execution(PlanningError::DeadlineExceeded { .. }) => {
                ActionErrorKind::DeadlineExceeded
            }
            SwapErrorKind::Planning(PlanningError::UserRejected)
            | SwapErrorKind::Execution(PlanningError::UserRejected) => {
                ActionErrorKind::UserRejected
            }
            SwapErrorKind::Execution(PlanningError::Transport(_)) => {
                ActionErrorKind::TransportError
            }
            SwapErrorKind::Planning(_) | SwapErrorKind::Execution(_) => {
                ActionErrorKind::PlanningError
            }
            SwapErrorKind::UnhandledApprovals { count } => {
                ActionErrorKind::UnhandledApprovalRequirement { count: *count }
            }
            SwapErrorKind::Submission(op) => op.kind(),
            SwapErrorKind::BatchUnresolved { batch_id, .. } => ActionErrorKind::StatusUnresolved {
                batch_id: batch_id.clone(),
            },
            SwapErrorKind::BatchFailed { batch_id } => ActionErrorKind::BatchFailed {
                batch_id: batch_id.clone(),
            },
        };
        ActionError::new(kind, err.phase.action_phase(), err.to_string())
    }
}

/// Builder error
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_map_to_operation_errors() {
        assert_eq!(
            OperationError::from(SessionError::UserRejected),
            OperationError::UserRejected
        );
        assert_eq!(
            OperationError::from(SessionError::Unavailable),
            OperationError::SessionUnavailable
        );
        assert_eq!(
            OperationError::from(SessionError::Timeout("30s".into())).kind(),
            ActionErrorKind::TransportError
        );
    }

    #[test]
    fn test_unresolved_batch_keeps_id() {
        let err = BatchError::Unresolved {
            batch_id: BatchId::new("0xabc"),
            call_count: 2,
            wait_error: SessionError::Timeout("wait".into()),
            status_error: SessionError::Transport("rpc down".into()),
        };

        let action_error = ActionError::from(err);
        assert_eq!(action_error.phase, ActionPhase::Resolution);
        assert_eq!(
            action_error.kind,
            ActionErrorKind::StatusUnresolved {
                batch_id: BatchId::new("0xabc")
            }
        );
    }

    #[test]
    fn test_swap_error_kinds() {
        let err = SwapError::new(
            SwapPhase::Executing,
            SwapErrorKind::Execution(PlanningError::DeadlineExceeded {
                deadline: 10,
                now: 11,
            }),
        );
        let action_error = ActionError::from(err);
        assert_eq!(action_error.kind, ActionErrorKind::DeadlineExceeded);
        assert_eq!(action_error.phase, ActionPhase::Executing);

        let err = SwapError::new(
            SwapPhase::ApprovalCheck,
            SwapErrorKind::UnhandledApprovals { count: 2 },
        );
        assert_eq!(
            ActionError::from(err).kind,
            ActionErrorKind::UnhandledApprovalRequirement { count: 2 }
        );
    }

    #[test]
    fn test_swap_batch_errors_keep_batch_id() {
        let err = SwapError::new(
            SwapPhase::Confirming,
            SwapErrorKind::BatchUnresolved {
                batch_id: BatchId::new("0xabc"),
                call_count: 2,
                reason: "wait failed".into(),
            },
        );
        let action_error = ActionError::from(err);
        assert_eq!(action_error.phase, ActionPhase::Confirming);
        assert_eq!(
            action_error.kind,
            ActionErrorKind::StatusUnresolved {
                batch_id: BatchId::new("0xabc")
            }
        );

        let err = SwapError::new(
            SwapPhase::Confirming,
            SwapErrorKind::BatchFailed {
                batch_id: BatchId::new("0xdef"),
            },
        );
        assert_eq!(
            ActionError::from(err).kind,
            ActionErrorKind::BatchFailed {
                batch_id: BatchId::new("0xdef")
            }
        );

        let err = SwapError::new(
            SwapPhase::Executing,
            SwapErrorKind::Submission(OperationError::UserRejected),
        );
        assert_eq!(ActionError::from(err).kind, ActionErrorKind::UserRejected);
    }

    #[test]
    fn test_chain_switch_rejection() {
        let err = ChainSwitchError {
            target: 8453,
            cause: SessionError::UserRejected,
        };
        let action_error = ActionError::from(err);
        assert_eq!(action_error.kind, ActionErrorKind::ChainSwitchError);
        assert_eq!(action_error.phase, ActionPhase::ChainSelection);
    }
}
