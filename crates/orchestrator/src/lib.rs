//! Sequencing of wallet actions: chain preconditions, single operations,
//! atomic batches with status resolution, and the swap flow, wrapped by a
//! controller that publishes one outcome per action slot.

pub mod batch;
pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod guard;
pub mod swap;


// Re-export main types
pub use batch::{AtomicBatchExecutor, BatchSubmission, ResolutionState};
pub use config::OrchestratorConfig;
pub use controller::{ActionController, ActionControllerBuilder, SlotState};
pub use error::{
    BatchError, BuilderError, ChainSwitchError, OperationError, SwapError, SwapErrorKind,
};
pub use executor::{signature_of, OperationExecutor, OperationRequest};
pub use guard::{ChainCheck, ChainGuard};
pub use swap::{
    ApprovalGate, Clock, ManualClock, SwapOrchestrator, SwapParams, SwapPhase, SwapSettings,
    SystemClock,
};
