use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};

lazy_static! {
    // ═══════════════════════════════════════════════════════════════════════════
    // ACTION METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Finished action invocations by action and outcome
    pub static ref ACTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "wallet_actions_actions_total",
        "Total action invocations by outcome",
        &["action", "outcome"]
    )
    .unwrap();

    /// Action duration histogram (in milliseconds)
    pub static ref ACTION_DURATION: HistogramVec = register_histogram_vec!(
        "wallet_actions_action_duration_ms",
        "Action duration in milliseconds",
        &["action"],
        vec![10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0, 15000.0, 60000.0]
    )
    .unwrap();

    /// Invocations currently running per action
    pub static ref ACTIONS_IN_FLIGHT: IntGaugeVec = register_int_gauge_vec!(
        "wallet_actions_actions_in_flight",
        "Action invocations currently running",
        &["action"]
    )
    .unwrap();

    /// Failed invocations by action and error kind, counted from error events
    pub static ref ACTION_ERRORS: IntCounterVec = register_int_counter_vec!(
        "wallet_actions_action_errors_total",
        "Total action errors by kind",
        &["action", "kind"]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // SESSION METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Chain precondition checks by outcome (skipped/requested/failed)
    pub static ref CHAIN_SWITCHES: IntCounterVec = register_int_counter_vec!(
        "wallet_actions_chain_switches_total",
        "Chain precondition checks by outcome",
        &["outcome"]
    )
    .unwrap();

    /// Signature verifications by result (valid/invalid/skipped)
    pub static ref SIGNATURE_VERIFICATIONS: IntCounterVec = register_int_counter_vec!(
        "wallet_actions_signature_verification_total",
        "Signature verifications by result",
        &["result"]
    )
    .unwrap();

    /// Observed transaction receipts by status
    pub static ref RECEIPTS: IntCounterVec = register_int_counter_vec!(
        "wallet_actions_receipts_total",
        "Observed transaction receipts by status",
        &["status"]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // BATCH METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Batch resolutions by path (primary/fallback/unresolved)
    pub static ref BATCH_RESOLUTIONS: IntCounterVec = register_int_counter_vec!(
        "wallet_actions_batch_resolution_total",
        "Batch status resolutions by path",
        &["path"]
    )
    .unwrap();

    /// Resolved batches by final status
    pub static ref BATCH_FINAL_STATUS: IntCounterVec = register_int_counter_vec!(
        "wallet_actions_batch_final_status_total",
        "Resolved batches by final status",
        &["status"]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // SWAP METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Swap phase transitions by phase and outcome
    pub static ref SWAP_PHASES: IntCounterVec = register_int_counter_vec!(
        "wallet_actions_swap_phase_total",
        "Swap phases by outcome",
        &["phase", "outcome"]
    )
    .unwrap();
}
