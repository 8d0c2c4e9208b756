use serde::{Deserialize, Serialize};

use crate::{BatchId, TxHash};

/// Final status of an atomic batch as surfaced to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Pending,
    Confirmed,
    Failed,
    Unknown,
}

impl BatchStatus {
    /// Map a wallet status code (100 pending, 200 confirmed, 4xx-6xx failures)
    pub fn from_code(code: u16) -> Self {
        match code {
            100..=199 => BatchStatus::Pending,
            200..=299 => BatchStatus::Confirmed,
            400..=699 => BatchStatus::Failed,
            _ => BatchStatus::Unknown,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, BatchStatus::Confirmed | BatchStatus::Failed)
    }
}

/// Receipt for one on-chain transaction carrying batch calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallReceipt {
    pub transaction_hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
}

/// Raw status report returned by the wallet for a batch id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStatusReport {
    pub id: BatchId,
    pub status_code: u16,
    pub atomic: bool,
    #[serde(default)]
    pub receipts: Vec<CallReceipt>,
}

impl BatchStatusReport {
    pub fn status(&self) -> BatchStatus {
        BatchStatus::from_code(self.status_code)
    }
}

/// Outcome of a single call within a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum CallOutcome {
    Pending,
    Succeeded { transaction_hash: TxHash },
    Reverted { transaction_hash: TxHash },
}

/// Which resolution path produced the final status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionPath {
    /// Wait-for-completion returned
    Primary,
    /// Wait failed; a single status query answered instead
    Fallback,
}

/// Resolved result of an atomic batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub batch_id: BatchId,
    pub per_call_outcome: Vec<CallOutcome>,
    pub final_status: BatchStatus,
    pub resolved_via: ResolutionPath,
}

impl BatchResult {
    /// Build from a wallet report, aligning outcomes with the submitted calls
    ///
    /// Atomic batches land in a single transaction, so one receipt covers
    /// every call. Otherwise receipts are matched to calls by position and
    /// calls without a receipt stay `Pending`.
    pub fn from_report(
        report: &BatchStatusReport,
        call_count: usize,
        resolved_via: ResolutionPath,
    ) -> Self {
        let outcome_for = |receipt: &CallReceipt| {
            if receipt.success {
                CallOutcome::Succeeded {
                    transaction_hash: receipt.transaction_hash,
                }
            } else {
                CallOutcome::Reverted {
                    transaction_hash: receipt.transaction_hash,
                }
            }
        };

        let per_call_outcome = match report.receipts.as_slice() {
            [single] if report.atomic => vec![outcome_for(single); call_count],
            receipts => (0..call_count)
                .map(|i| receipts.get(i).map(outcome_for).unwrap_or(CallOutcome::Pending))
                .collect(),
        };

        Self {
            batch_id: report.id.clone(),
            per_call_outcome,
            final_status: report.status(),
            resolved_via,
        }
    }
}
