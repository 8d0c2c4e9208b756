use serde::{Deserialize, Serialize};

/// How the swap flow treats a route plan that requires token approvals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalPolicy {
    /// Fail with an unhandled-approval error before anything is submitted
    #[default]
    Block,
    /// Prepend the approval calls to the same atomic multicall
    Bundle,
    /// Ask the approval gate; bundle on acceptance, fail otherwise
    Confirm,
}

/// What happens when an action is triggered while the same action is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InFlightPolicy {
    /// Wait for the running invocation to finish, then run
    #[default]
    Queue,
    /// Fail immediately without touching the slot
    Reject,
}
