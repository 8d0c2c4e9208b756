use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{BatchId, BatchResult, ChainId, SignInAssertion, Signature, TxHash};

/// User-triggerable action; each kind owns one result slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SwitchChain,
    SignMessage,
    SignTypedData,
    SendTransaction,
    SignIn,
    SendBatch,
    Swap,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::SwitchChain,
        ActionKind::SignMessage,
        ActionKind::SignTypedData,
        ActionKind::SendTransaction,
        ActionKind::SignIn,
        ActionKind::SendBatch,
        ActionKind::Swap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::SwitchChain => "switch_chain",
            ActionKind::SignMessage => "sign_message",
            ActionKind::SignTypedData => "sign_typed_data",
            ActionKind::SendTransaction => "send_transaction",
            ActionKind::SignIn => "sign_in",
            ActionKind::SendBatch => "send_batch",
            ActionKind::Swap => "swap",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status field of a transaction receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// On-chain confirmation record yielded by the receipt watcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub status: ReceiptStatus,
    pub block_number: u64,
}

/// Reference to a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRef {
    pub hash: TxHash,
    /// Filled in once the receipt is observed
    pub receipt_status: Option<ReceiptStatus>,
}

impl TransactionRef {
    pub fn new(hash: TxHash) -> Self {
        Self {
            hash,
            receipt_status: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKind {
    Message,
    TypedData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResult {
    pub transaction: TransactionRef,
    /// Approval calls bundled ahead of the route calls
    pub approvals_bundled: usize,
}

/// Result published into an action slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionResult {
    ChainSelected {
        chain_id: ChainId,
        switched: bool,
    },
    Signature {
        kind: SignatureKind,
        value: Signature,
        /// `None` when no address was available to verify against
        verified: Option<bool>,
    },
    Transaction(TransactionRef),
    Batch(BatchResult),
    Swap(SwapResult),
    SignIn(SignInAssertion),
}

impl ActionResult {
    /// Transaction hash a receipt can be watched for, if any
    pub fn transaction_hash(&self) -> Option<TxHash> {
        match self {
            ActionResult::Transaction(tx) => Some(tx.hash),
            ActionResult::Swap(swap) => Some(swap.transaction.hash),
            _ => None,
        }
    }

    pub fn transaction_mut(&mut self) -> Option<&mut TransactionRef> {
        match self {
            ActionResult::Transaction(tx) => Some(tx),
            ActionResult::Swap(swap) => Some(&mut swap.transaction),
            _ => None,
        }
    }
}

/// Phase of an action in which a failure originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPhase {
    Precondition,
    ChainSelection,
    Submission,
    Verification,
    Resolution,
    Planning,
    ApprovalCheck,
    Executing,
    Confirming,
}

impl fmt::Display for ActionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionPhase::Precondition => "precondition",
            ActionPhase::ChainSelection => "chain_selection",
            ActionPhase::Submission => "submission",
            ActionPhase::Verification => "verification",
            ActionPhase::Resolution => "resolution",
            ActionPhase::Planning => "planning",
            ActionPhase::ApprovalCheck => "approval_check",
            ActionPhase::Executing => "executing",
            ActionPhase::Confirming => "confirming",
        };
        f.write_str(name)
    }
}

/// Failure taxonomy surfaced to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionErrorKind {
    UserRejected,
    SessionUnavailable,
    TransportError,
    ChainSwitchError,
    /// Both batch status paths failed; the batch id stays valid for a retry
    StatusUnresolved { batch_id: BatchId },
    /// The wallet reported the batch as failed or reverted
    BatchFailed { batch_id: BatchId },
    PlanningError,
    DeadlineExceeded,
    UnhandledApprovalRequirement { count: usize },
    InvalidRequest,
    ActionInFlight,
}

impl ActionErrorKind {
    /// Stable label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionErrorKind::UserRejected => "user_rejected",
            ActionErrorKind::SessionUnavailable => "session_unavailable",
            ActionErrorKind::TransportError => "transport_error",
            ActionErrorKind::ChainSwitchError => "chain_switch_error",
            ActionErrorKind::StatusUnresolved { .. } => "status_unresolved",
            ActionErrorKind::BatchFailed { .. } => "batch_failed",
            ActionErrorKind::PlanningError => "planning_error",
            ActionErrorKind::DeadlineExceeded => "deadline_exceeded",
            ActionErrorKind::UnhandledApprovalRequirement { .. } => {
                "unhandled_approval_requirement"
            }
            ActionErrorKind::InvalidRequest => "invalid_request",
            ActionErrorKind::ActionInFlight => "action_in_flight",
        }
    }
}

/// Failure published into an action slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{phase} failed: {message}")]
pub struct ActionError {
    pub kind: ActionErrorKind,
    pub message: String,
    pub phase: ActionPhase,
}

impl ActionError {
    pub fn new(kind: ActionErrorKind, phase: ActionPhase, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            phase,
        }
    }

    pub fn invalid_request(phase: ActionPhase, message: impl Into<String>) -> Self {
        Self::new(ActionErrorKind::InvalidRequest, phase, message)
    }

    pub fn session_unavailable(phase: ActionPhase) -> Self {
        Self::new(
            ActionErrorKind::SessionUnavailable,
            phase,
            "no connected account",
        )
    }
}
