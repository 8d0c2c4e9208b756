use serde::{Deserialize, Serialize};
use wallet_actions_types::{Address, Call, SwapStep, U256};

/// Input to the route planner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub owner: Address,
    pub router: Address,
    pub steps: Vec<SwapStep>,
    pub final_recipient: Address,
}

impl RouteRequest {
    /// Earliest deadline across the requested legs
    pub fn deadline(&self) -> Option<u64> {
        self.steps.iter().map(|s| s.deadline).min()
    }
}

/// Calls to run through the router, with any approvals ahead of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MulticallRequest {
    pub calls: Vec<Call>,
    /// Native value attached to the multicall
    pub value: U256,
    pub account: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<u64>,
    /// Unix time the caller last checked the deadline at; the system clock when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now: Option<u64>,
}
