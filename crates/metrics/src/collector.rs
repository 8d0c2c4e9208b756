use std::time::Duration;

use prometheus::{Encoder, TextEncoder};
use wallet_actions_types::{ActionKind, BatchStatus, ReceiptStatus, ResolutionPath};

use crate::metrics::*;

/// Metrics collector for wallet action orchestration
///
/// Metrics live in the process-wide default registry, so every collector
/// handle records into and exports the same series.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    _private: (),
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self { _private: () }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACTION METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Record an invocation entering its slot
    pub fn record_action_started(&self, action: ActionKind) {
        ACTIONS_IN_FLIGHT.with_label_values(&[action.as_str()]).inc();
    }

    /// Record an invocation leaving its slot with its outcome and duration
    pub fn record_action_finished(
        &self,
        action: ActionKind,
        outcome: ActionOutcome,
        duration: Duration,
    ) {
        ACTIONS_IN_FLIGHT.with_label_values(&[action.as_str()]).dec();
        self.record_action_outcome(action, outcome);
        ACTION_DURATION
            .with_label_values(&[action.as_str()])
            .observe(duration.as_millis() as f64);
    }

    /// Count an outcome without a duration (rejected before running)
    pub fn record_action_outcome(&self, action: ActionKind, outcome: ActionOutcome) {
        ACTIONS_TOTAL
            .with_label_values(&[action.as_str(), outcome.as_str()])
            .inc();
    }

    pub fn record_action_error(&self, action: &str, kind: &str) {
        ACTION_ERRORS.with_label_values(&[action, kind]).inc();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SESSION METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn record_chain_check(&self, outcome: ChainSwitchOutcome) {
        let outcome_str = match outcome {
            ChainSwitchOutcome::Skipped => "skipped",
            ChainSwitchOutcome::Requested => "requested",
            ChainSwitchOutcome::Failed => "failed",
        };
        CHAIN_SWITCHES.with_label_values(&[outcome_str]).inc();
    }

    /// Record a verification result; `None` means no address to verify against
    pub fn record_signature_verification(&self, verified: Option<bool>) {
        let result = match verified {
            Some(true) => "valid",
            Some(false) => "invalid",
            None => "skipped",
        };
        SIGNATURE_VERIFICATIONS.with_label_values(&[result]).inc();
    }

    pub fn record_receipt(&self, status: ReceiptStatus) {
        let status_str = match status {
            ReceiptStatus::Success => "success",
            ReceiptStatus::Reverted => "reverted",
        };
        RECEIPTS.with_label_values(&[status_str]).inc();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BATCH METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Record a resolved batch with the path that produced its status
    pub fn record_batch_resolved(&self, path: ResolutionPath, status: BatchStatus) {
        let path_str = match path {
            ResolutionPath::Primary => "primary",
            ResolutionPath::Fallback => "fallback",
        };
        BATCH_RESOLUTIONS.with_label_values(&[path_str]).inc();

        let status_str = match status {
            BatchStatus::Pending => "pending",
            BatchStatus::Confirmed => "confirmed",
            BatchStatus::Failed => "failed",
            BatchStatus::Unknown => "unknown",
        };
        BATCH_FINAL_STATUS.with_label_values(&[status_str]).inc();
    }

    /// Record a batch whose wait and fallback query both failed
    pub fn record_batch_unresolved(&self) {
        BATCH_RESOLUTIONS.with_label_values(&["unresolved"]).inc();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SWAP METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn record_swap_phase(&self, phase: &str, succeeded: bool) {
        let outcome = if succeeded { "ok" } else { "failed" };
        SWAP_PHASES.with_label_values(&[phase, outcome]).inc();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EXPORT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Render all metrics in the Prometheus text exposition format
    pub fn export_metrics(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::EncodingError(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricsError::EncodingError(e.to_string()))
    }
}

/// Outcome label for a finished action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded,
    Failed,
    /// Refused because the same action was already running
    Rejected,
}

impl ActionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionOutcome::Succeeded => "succeeded",
            ActionOutcome::Failed => "failed",
            ActionOutcome::Rejected => "rejected",
        }
    }
}

/// Outcome of a chain precondition check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainSwitchOutcome {
    /// Already on the required chain
    Skipped,
    Requested,
    Failed,
}

/// Metrics error types
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("encoding error: {0}")]
    EncodingError(String),
}
