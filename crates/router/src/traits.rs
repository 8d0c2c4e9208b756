use async_trait::async_trait;
use wallet_actions_session::WalletSession;
use wallet_actions_types::{Call, RoutePlan, TxHash};

use crate::{MulticallRequest, PlanningError, RouteRequest};

/// Builds route plans for swap requests
#[async_trait]
pub trait RoutePlanner: Send + Sync {
    /// Quote the requested legs and return the calls and approvals needed
    async fn build_route_plan(&self, request: &RouteRequest) -> Result<RoutePlan, PlanningError>;
}

/// Turns a planned set of calls into what the wallet executes
///
/// A request without approvals prepares to a single call and is sent with
/// `execute_atomic_multicall`. Anything longer is handed to the wallet as an
/// atomic batch by the caller.
#[async_trait]
pub trait MulticallExecutor: Send + Sync {
    /// Calls that carry out `request`: approvals first, then the packed route
    async fn prepare_multicall(
        &self,
        request: &MulticallRequest,
    ) -> Result<Vec<Call>, PlanningError>;

    /// Send a request that prepares to a single call as one transaction
    async fn execute_atomic_multicall(
        &self,
        session: &dyn WalletSession,
        request: &MulticallRequest,
    ) -> Result<TxHash, PlanningError>;
}
