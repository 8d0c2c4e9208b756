use serde::{Deserialize, Serialize};

use crate::{Address, Call, U256};

/// Native asset placeholder used by route planners
pub const NATIVE_TOKEN: Address = Address::ZERO;

/// Liquidity venue family for a swap leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PoolKind {
    V2,
    V3,
    V4,
}

/// Which side of the swap is fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapSide {
    ExactIn,
    ExactOut,
}

/// A single swap leg requested from the route planner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapStep {
    pub kind: PoolKind,
    /// Recipient of this leg's output
    pub to: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub side: SwapSide,
    pub amount: U256,
    /// Minimum output for `ExactIn`, maximum input for `ExactOut`
    pub limit: U256,
    /// Unix timestamp (seconds) after which the leg must not execute
    pub deadline: u64,
}

/// Token allowance that must exist before the route can execute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequirement {
    pub token: Address,
    pub spender: Address,
    pub amount: U256,
    /// Planner-built `approve` call granting the allowance
    pub call: Call,
}

/// Route plan produced by the external planner, consumed read-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    pub steps: Vec<SwapStep>,
    pub calls: Vec<Call>,
    /// Distinct allowances; planners do not repeat a (token, spender) pair
    pub required_approvals: Vec<ApprovalRequirement>,
    /// Native value attached to the multicall (wei)
    pub total_value: U256,
}

impl RoutePlan {
    pub fn needs_approvals(&self) -> bool {
        !self.required_approvals.is_empty()
    }

    /// Earliest deadline across all legs
    pub fn deadline(&self) -> Option<u64> {
        self.steps.iter().map(|s| s.deadline).min()
    }
}
