use alloy_primitives::keccak256;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use wallet_actions_session::WalletSession;
use wallet_actions_types::{Call, RoutePlan, TxHash};

use crate::{MulticallExecutor, MulticallRequest, PlanningError, RoutePlanner, RouteRequest};

/// Planner returning a fixed plan, for testing
pub struct MockRoutePlanner {
    response: RwLock<Result<RoutePlan, PlanningError>>,
    requests: Arc<Mutex<Vec<RouteRequest>>>,
}

impl MockRoutePlanner {
    pub fn new(plan: RoutePlan) -> Self {
        Self::with_response(Ok(plan))
    }

    pub fn failing(err: PlanningError) -> Self {
        Self::with_response(Err(err))
    }

    fn with_response(response: Result<RoutePlan, PlanningError>) -> Self {
        Self {
            response: RwLock::new(response),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn set_response(&self, response: Result<RoutePlan, PlanningError>) {
        *self.response.write().await = response;
    }

    pub async fn requests(&self) -> Vec<RouteRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl RoutePlanner for MockRoutePlanner {
    async fn build_route_plan(&self, request: &RouteRequest) -> Result<RoutePlan, PlanningError> {
        self.requests.lock().await.push(request.clone());
        self.response.read().await.clone()
    }
}

/// Executor that records requests without touching the session
///
/// Preparing packs every call addressed like the last one into a single
/// call to that address and keeps the calls before it, mirroring how a
/// router keeps approvals ahead of its packed route.
pub struct MockMulticallExecutor {
    error: RwLock<Option<PlanningError>>,
    requests: Arc<Mutex<Vec<MulticallRequest>>>,
}

impl MockMulticallExecutor {
    pub fn new() -> Self {
        Self {
            error: RwLock::new(None),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(err: PlanningError) -> Self {
        Self {
            error: RwLock::new(Some(err)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn requests(&self) -> Vec<MulticallRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockMulticallExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MulticallExecutor for MockMulticallExecutor {
    async fn prepare_multicall(
        &self,
        request: &MulticallRequest,
    ) -> Result<Vec<Call>, PlanningError> {
        self.requests.lock().await.push(request.clone());
        if let Some(err) = self.error.read().await.clone() {
            return Err(err);
        }

        let target = request
            .calls
            .last()
            .map(|c| c.to)
            .ok_or_else(|| PlanningError::InvalidRequest {
                reason: "no calls to prepare".into(),
            })?;
        let mut calls: Vec<Call> = request
            .calls
            .iter()
            .filter(|c| c.to != target)
            .cloned()
            .collect();
        calls.push(Call::new(target).with_value(request.value));
        Ok(calls)
    }

    async fn execute_atomic_multicall(
        &self,
        _session: &dyn WalletSession,
        _request: &MulticallRequest,
    ) -> Result<TxHash, PlanningError> {
        if let Some(err) = self.error.read().await.clone() {
            return Err(err);
        }
        let executed = self.requests.lock().await.len();
        Ok(keccak256(format!("multicall-{executed}")))
    }
}
