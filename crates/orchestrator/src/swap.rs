use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use wallet_actions_metrics::MetricsCollector;
use wallet_actions_router::{
    MulticallExecutor, MulticallRequest, PlanningError, RoutePlanner, RouteRequest,
};
use wallet_actions_session::WalletSession;
use wallet_actions_types::{
    ActionPhase, Address, ApprovalPolicy, ApprovalRequirement, BatchStatus, Call, CallOutcome,
    PoolKind, RoutePlan, SwapResult, SwapSide, SwapStep, TransactionRef, TxHash, U256,
};

use crate::{AtomicBatchExecutor, BatchError, BatchSubmission, SwapError, SwapErrorKind};

/// Swap flow phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapPhase {
    Planning,
    ApprovalCheck,
    Executing,
    Confirming,
    Done,
    Failed,
}

impl SwapPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapPhase::Planning => "planning",
            SwapPhase::ApprovalCheck => "approval_check",
            SwapPhase::Executing => "executing",
            SwapPhase::Confirming => "confirming",
            SwapPhase::Done => "done",
            SwapPhase::Failed => "failed",
        }
    }

    /// Phase tag used on the surfaced action error
    pub fn action_phase(&self) -> ActionPhase {
        match self {
            SwapPhase::Planning => ActionPhase::Planning,
            SwapPhase::ApprovalCheck => ActionPhase::ApprovalCheck,
            SwapPhase::Executing => ActionPhase::Executing,
            SwapPhase::Confirming | SwapPhase::Done | SwapPhase::Failed => {
                ActionPhase::Confirming
            }
        }
    }
}

impl fmt::Display for SwapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing swap request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub min_amount_out: U256,
    pub kind: PoolKind,
    /// Defaults to the connected account
    pub recipient: Option<Address>,
    /// Absolute unix deadline; defaults to now plus the configured window
    pub deadline: Option<u64>,
}

impl SwapParams {
    pub fn new(token_in: Address, token_out: Address, amount_in: U256) -> Self {
        Self {
            token_in,
            token_out,
            amount_in,
            min_amount_out: U256::ZERO,
            kind: PoolKind::V3,
            recipient: None,
            deadline: None,
        }
    }

    pub fn with_min_amount_out(mut self, min_amount_out: U256) -> Self {
        self.min_amount_out = min_amount_out;
        self
    }

    pub fn with_pool(mut self, kind: PoolKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn with_deadline(mut self, deadline: u64) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Asks the user whether planned token approvals may be bundled
#[async_trait]
pub trait ApprovalGate: Send + Sync {
    async fn confirm(&self, approvals: &[ApprovalRequirement]) -> bool;
}

/// Source of the current unix time in seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Swap-specific settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapSettings {
    pub router: Option<Address>,
    pub deadline_secs: u64,
    pub approval_policy: ApprovalPolicy,
}

impl Default for SwapSettings {
    fn default() -> Self {
        Self {
            router: None,
            deadline_secs: 600,
            approval_policy: ApprovalPolicy::Block,
        }
    }
}

/// What the executing phase handed to the wallet
#[derive(Debug, Clone, PartialEq, Eq)]
enum Submitted {
    Transaction(TxHash),
    /// Approvals and route went out together and still need resolving
    Batch(BatchSubmission),
}

/// Runs a swap through planning, approval handling and execution
///
/// Nothing is submitted to the wallet unless planning and the approval
/// check both succeed and the deadline has not passed. A route without
/// bundled approvals is one router transaction; bundled approvals go out
/// with the route as an atomic batch that is resolved before the swap
/// reports success.
pub struct SwapOrchestrator {
    session: Arc<dyn WalletSession>,
    planner: Arc<dyn RoutePlanner>,
    executor: Arc<dyn MulticallExecutor>,
    batches: AtomicBatchExecutor,
    approval_gate: Option<Arc<dyn ApprovalGate>>,
    clock: Arc<dyn Clock>,
    settings: SwapSettings,
    metrics: MetricsCollector,
}

impl SwapOrchestrator {
    pub fn new(
        session: Arc<dyn WalletSession>,
        planner: Arc<dyn RoutePlanner>,
        executor: Arc<dyn MulticallExecutor>,
        settings: SwapSettings,
    ) -> Self {
        Self {
            batches: AtomicBatchExecutor::new(session.clone(), false),
            session,
            planner,
            executor,
            approval_gate: None,
            clock: Arc::new(SystemClock),
            settings,
            metrics: MetricsCollector::new(),
        }
    }

    pub fn with_approval_gate(mut self, gate: Arc<dyn ApprovalGate>) -> Self {
        self.approval_gate = Some(gate);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Refuse to bundle approvals when the wallet cannot batch atomically
    pub fn with_force_atomic(mut self, force_atomic: bool) -> Self {
        self.batches = AtomicBatchExecutor::new(self.session.clone(), force_atomic);
        self
    }

    pub async fn execute(&self, params: &SwapParams) -> Result<SwapResult, SwapError> {
        let result = self.run(params).await;
        match &result {
            Ok(swap) => {
                info!(
                    tx_hash = %swap.transaction.hash,
                    approvals_bundled = swap.approvals_bundled,
                    stage = ?SwapPhase::Done,
                    "Swap submitted"
                );
            }
            Err(err) => {
                warn!(
                    stage = ?SwapPhase::Failed,
                    failed_in = %err.phase,
                    error = %err.kind,
                    "Swap failed"
                );
            }
        }
        result
    }

    async fn run(&self, params: &SwapParams) -> Result<SwapResult, SwapError> {
        // Phase 1: plan the route
        info!(
            stage = ?SwapPhase::Planning,
            token_in = %params.token_in,
            token_out = %params.token_out,
            "Planning swap"
        );
        let (plan, owner, deadline) = self
            .plan(params)
            .await
            .map_err(|kind| self.fail(SwapPhase::Planning, kind))?;
        self.metrics.record_swap_phase(SwapPhase::Planning.as_str(), true);

        // Phase 2: decide what to do with required approvals
        info!(
            stage = ?SwapPhase::ApprovalCheck,
            approvals = plan.required_approvals.len(),
            policy = ?self.settings.approval_policy,
            "Checking approvals"
        );
        let approvals_bundled = self
            .check_approvals(&plan)
            .await
            .map_err(|kind| self.fail(SwapPhase::ApprovalCheck, kind))?;
        self.metrics
            .record_swap_phase(SwapPhase::ApprovalCheck.as_str(), true);

        // Phase 3: submit the multicall
        info!(
            stage = ?SwapPhase::Executing,
            calls = plan.calls.len() + approvals_bundled,
            "Executing swap"
        );
        let submitted = self
            .submit(&plan, approvals_bundled, owner, deadline)
            .await
            .map_err(|kind| self.fail(SwapPhase::Executing, kind))?;
        self.metrics.record_swap_phase(SwapPhase::Executing.as_str(), true);

        // Phase 4: settle on the transaction that carries the route
        let hash = self
            .confirm(submitted)
            .await
            .map_err(|kind| self.fail(SwapPhase::Confirming, kind))?;
        info!(stage = ?SwapPhase::Confirming, tx_hash = %hash, "Swap transaction submitted");
        self.metrics
            .record_swap_phase(SwapPhase::Confirming.as_str(), true);

        Ok(SwapResult {
            transaction: TransactionRef::new(hash),
            approvals_bundled,
        })
    }

    fn fail(&self, phase: SwapPhase, kind: SwapErrorKind) -> SwapError {
        self.metrics.record_swap_phase(phase.as_str(), false);
        SwapError::new(phase, kind)
    }

    async fn plan(&self, params: &SwapParams) -> Result<(RoutePlan, Address, u64), SwapErrorKind> {
        let router = self.settings.router.ok_or_else(|| {
            SwapErrorKind::InvalidRequest("no swap router configured".to_string())
        })?;
        if params.amount_in.is_zero() {
            return Err(SwapErrorKind::InvalidRequest(
                "amount in must be positive".to_string(),
            ));
        }
        if params.token_in == params.token_out {
            return Err(SwapErrorKind::InvalidRequest(
                "token in and token out are the same".to_string(),
            ));
        }

        let snapshot = self.session.snapshot().await;
        let owner = snapshot
            .primary_address()
            .filter(|_| snapshot.is_connected())
            .ok_or(SwapErrorKind::SessionUnavailable)?;

        let now = self.clock.now();
        let deadline = params
            .deadline
            .unwrap_or_else(|| now.saturating_add(self.settings.deadline_secs));
        if now > deadline {
            return Err(SwapErrorKind::DeadlineExceeded { deadline, now });
        }

        let request = RouteRequest {
            owner,
            router,
            steps: vec![SwapStep {
                kind: params.kind,
                to: params.recipient.unwrap_or(owner),
                token_in: params.token_in,
                token_out: params.token_out,
                side: SwapSide::ExactIn,
                amount: params.amount_in,
                limit: params.min_amount_out,
                deadline,
            }],
            final_recipient: params.recipient.unwrap_or(owner),
        };

        let plan = self
            .planner
            .build_route_plan(&request)
            .await
            .map_err(SwapErrorKind::Planning)?;
        if plan.calls.is_empty() {
            return Err(SwapErrorKind::Planning(PlanningError::NoViableRoute));
        }

        let deadline = plan.deadline().map_or(deadline, |d| d.min(deadline));
        Ok((plan, owner, deadline))
    }

    /// Returns how many approval calls get bundled
    async fn check_approvals(&self, plan: &RoutePlan) -> Result<usize, SwapErrorKind> {
        if !plan.needs_approvals() {
            return Ok(0);
        }

        let count = plan.required_approvals.len();
        match self.settings.approval_policy {
            ApprovalPolicy::Block => Err(SwapErrorKind::UnhandledApprovals { count }),
            ApprovalPolicy::Bundle => Ok(count),
            ApprovalPolicy::Confirm => {
                let Some(gate) = &self.approval_gate else {
                    error!(count, "Approval confirmation required but no approval gate set");
                    return Err(SwapErrorKind::UnhandledApprovals { count });
                };
                if gate.confirm(&plan.required_approvals).await {
                    Ok(count)
                } else {
                    Err(SwapErrorKind::UnhandledApprovals { count })
                }
            }
        }
    }

    async fn submit(
        &self,
        plan: &RoutePlan,
        approvals_bundled: usize,
        account: Address,
        deadline: u64,
    ) -> Result<Submitted, SwapErrorKind> {
        let now = self.clock.now();
        if now > deadline {
            return Err(SwapErrorKind::DeadlineExceeded { deadline, now });
        }

        let calls: Vec<Call> = plan
            .required_approvals
            .iter()
            .take(approvals_bundled)
            .map(|a| a.call.clone())
            .chain(plan.calls.iter().cloned())
            .collect();

        let request = MulticallRequest {
            calls,
            value: plan.total_value,
            account,
            deadline: Some(deadline),
            now: Some(now),
        };

        let prepared = self
            .executor
            .prepare_multicall(&request)
            .await
            .map_err(SwapErrorKind::Execution)?;
        if prepared.len() == 1 {
            let hash = self
                .executor
                .execute_atomic_multicall(self.session.as_ref(), &request)
                .await
                .map_err(SwapErrorKind::Execution)?;
            return Ok(Submitted::Transaction(hash));
        }

        let submission = self
            .batches
            .submit(&prepared)
            .await
            .map_err(SwapErrorKind::Submission)?;
        Ok(Submitted::Batch(submission))
    }

    /// Hash of the transaction carrying the route, once the wallet reports it
    async fn confirm(&self, submitted: Submitted) -> Result<TxHash, SwapErrorKind> {
        let submission = match submitted {
            Submitted::Transaction(hash) => return Ok(hash),
            Submitted::Batch(submission) => submission,
        };

        let result = self
            .batches
            .resolve(&submission.batch_id, submission.call_count)
            .await
            .map_err(|err| {
                let reason = err.to_string();
                match err {
                    BatchError::Unresolved {
                        batch_id,
                        call_count,
                        ..
                    } => SwapErrorKind::BatchUnresolved {
                        batch_id,
                        call_count,
                        reason,
                    },
                    BatchError::Submission(op) => SwapErrorKind::Submission(op),
                }
            })?;

        let reverted = result
            .per_call_outcome
            .iter()
            .any(|outcome| matches!(outcome, CallOutcome::Reverted { .. }));
        if result.final_status == BatchStatus::Failed || reverted {
            return Err(SwapErrorKind::BatchFailed {
                batch_id: result.batch_id,
            });
        }

        // the packed route is the last call
        match result.per_call_outcome.last() {
            Some(CallOutcome::Succeeded { transaction_hash }) => Ok(*transaction_hash),
            _ => Err(SwapErrorKind::BatchUnresolved {
                reason: format!(
                    "status {:?} without a receipt for the route call",
                    result.final_status
                ),
                batch_id: result.batch_id,
                call_count: submission.call_count,
            }),
        }
    }
}
