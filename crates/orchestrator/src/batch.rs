use std::sync::Arc;
use tracing::{debug, info, warn};
use wallet_actions_metrics::MetricsCollector;
use wallet_actions_session::{SessionError, WalletSession};
use wallet_actions_types::{BatchId, BatchResult, Call, Capability, ResolutionPath};

use crate::{BatchError, OperationError};

/// A batch accepted by the wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSubmission {
    pub batch_id: BatchId,
    pub call_count: usize,
    pub atomic: bool,
}

/// Resolution progress for a submitted batch
///
/// ```text
/// Waiting --wait ok--------> Resolved(Primary)
///    |
///    +--wait err--> Polling --status ok--> Resolved(Fallback)
///                      |
///                      +--status err--> Unresolved
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionState {
    Waiting,
    Polling { wait_error: SessionError },
    Resolved(BatchResult),
    Unresolved {
        wait_error: SessionError,
        status_error: SessionError,
    },
}

impl ResolutionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResolutionState::Resolved(_) | ResolutionState::Unresolved { .. }
        )
    }
}

/// Submits call batches and resolves their final status
///
/// Resolution tries the blocking wait first and falls back to exactly one
/// point-in-time status query. It never retries beyond that.
pub struct AtomicBatchExecutor {
    session: Arc<dyn WalletSession>,
    force_atomic: bool,
    metrics: MetricsCollector,
}

impl AtomicBatchExecutor {
    pub fn new(session: Arc<dyn WalletSession>, force_atomic: bool) -> Self {
        Self {
            session,
            force_atomic,
            metrics: MetricsCollector::new(),
        }
    }

    pub async fn submit(&self, calls: &[Call]) -> Result<BatchSubmission, OperationError> {
        if calls.is_empty() {
            return Err(OperationError::InvalidRequest(
                "batch must contain at least one call".to_string(),
            ));
        }

        let snapshot = self.session.snapshot().await;
        if !snapshot.is_connected() || snapshot.primary_address().is_none() {
            return Err(OperationError::SessionUnavailable);
        }

        let atomic = snapshot.supports(Capability::AtomicBatch);
        if self.force_atomic && !atomic {
            return Err(OperationError::Unsupported(
                "wallet does not support atomic batches".to_string(),
            ));
        }

        let batch_id = self.session.submit_atomic_batch(calls, atomic).await?;
        info!(
            batch_id = %batch_id,
            call_count = calls.len(),
            atomic,
            "Batch submitted"
        );

        Ok(BatchSubmission {
            batch_id,
            call_count: calls.len(),
            atomic,
        })
    }

    /// Advance the resolution state by one transition
    pub async fn step(
        &self,
        state: ResolutionState,
        batch_id: &BatchId,
        call_count: usize,
    ) -> ResolutionState {
        match state {
            ResolutionState::Waiting => match self.session.wait_for_batch_status(batch_id).await {
                Ok(report) => ResolutionState::Resolved(BatchResult::from_report(
                    &report,
                    call_count,
                    ResolutionPath::Primary,
                )),
                Err(wait_error) => {
                    warn!(
                        batch_id = %batch_id,
                        error = %wait_error,
                        "Batch wait failed, querying status"
                    );
                    ResolutionState::Polling { wait_error }
                }
            },
            ResolutionState::Polling { wait_error } => {
                match self.session.get_batch_status(batch_id).await {
                    Ok(report) => ResolutionState::Resolved(BatchResult::from_report(
                        &report,
                        call_count,
                        ResolutionPath::Fallback,
                    )),
                    Err(status_error) => ResolutionState::Unresolved {
                        wait_error,
                        status_error,
                    },
                }
            }
            terminal => terminal,
        }
    }

    /// Resolve a submitted batch to its final result
    pub async fn resolve(
        &self,
        batch_id: &BatchId,
        call_count: usize,
    ) -> Result<BatchResult, BatchError> {
        let snapshot = self.session.snapshot().await;
        let mut state = if snapshot.supports(Capability::BatchStatusWait) {
            ResolutionState::Waiting
        } else {
            debug!(batch_id = %batch_id, "Wallet cannot wait on batches, polling directly");
            ResolutionState::Polling {
                wait_error: SessionError::Unsupported("wallet_waitForCallsStatus".to_string()),
            }
        };

        loop {
            state = match state {
                ResolutionState::Resolved(result) => {
                    info!(
                        batch_id = %batch_id,
                        status = ?result.final_status,
                        resolved_via = ?result.resolved_via,
                        "Batch resolved"
                    );
                    self.metrics
                        .record_batch_resolved(result.resolved_via, result.final_status);
                    return Ok(result);
                }
                ResolutionState::Unresolved {
                    wait_error,
                    status_error,
                } => {
                    warn!(batch_id = %batch_id, "Batch status unresolved on both paths");
                    self.metrics.record_batch_unresolved();
                    return Err(BatchError::Unresolved {
                        batch_id: batch_id.clone(),
                        call_count,
                        wait_error,
                        status_error,
                    });
                }
                pending => self.step(pending, batch_id, call_count).await,
            };
        }
    }

    /// Submit and resolve in one go
    pub async fn execute(&self, calls: &[Call]) -> Result<BatchResult, BatchError> {
        let submission = self.submit(calls).await?;
        self.resolve(&submission.batch_id, submission.call_count).await
    }
}
