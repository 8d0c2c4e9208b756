use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn, Instrument};
use wallet_actions_metrics::{ActionOutcome, ActionSpan, MetricsCollector};
use wallet_actions_router::{MulticallExecutor, RoutePlanner, RouterMulticallExecutor};
use wallet_actions_session::{EcdsaVerifier, ReceiptWatcher, SignatureVerifier, WalletSession};
use wallet_actions_types::{
    ActionError, ActionErrorKind, ActionKind, ActionPhase, ActionResult, BatchId, BatchResult,
    Call, ChainId, InFlightPolicy, Receipt, SignInRequest, TransactionRequest, TxHash,
    TypedDataPayload,
};

use crate::{
    ApprovalGate, AtomicBatchExecutor, BatchError, BuilderError, ChainGuard, Clock,
    OperationError, OperationExecutor, OperationRequest, OrchestratorConfig, SwapErrorKind,
    SwapOrchestrator, SwapParams, SystemClock,
};

/// Contents of one action slot
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SlotState {
    #[default]
    Idle,
    Running {
        invocation_id: u64,
    },
    Succeeded {
        invocation_id: u64,
        result: ActionResult,
    },
    Failed {
        invocation_id: u64,
        error: ActionError,
    },
}

impl SlotState {
    pub fn result(&self) -> Option<&ActionResult> {
        match self {
            SlotState::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ActionError> {
        match self {
            SlotState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn invocation_id(&self) -> Option<u64> {
        match self {
            SlotState::Idle => None,
            SlotState::Running { invocation_id }
            | SlotState::Succeeded { invocation_id, .. }
            | SlotState::Failed { invocation_id, .. } => Some(*invocation_id),
        }
    }
}

#[derive(Default)]
struct Slot {
    /// Held for the whole invocation; one in-flight run per action
    running: Mutex<()>,
    state: RwLock<SlotState>,
}

/// Runs user actions against a wallet session and publishes one result
/// or error per action slot
pub struct ActionController {
    session: Arc<dyn WalletSession>,
    guard: ChainGuard,
    operations: OperationExecutor,
    batches: AtomicBatchExecutor,
    swaps: Option<SwapOrchestrator>,
    receipts: Option<Arc<dyn ReceiptWatcher>>,
    config: OrchestratorConfig,
    slots: [Slot; ActionKind::ALL.len()],
    invocations: AtomicU64,
    /// Call counts of batches whose status is not final yet
    submitted: RwLock<HashMap<BatchId, usize>>,
    metrics: MetricsCollector,
}

impl ActionController {
    pub fn builder() -> ActionControllerBuilder {
        ActionControllerBuilder::new()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<dyn WalletSession> {
        &self.session
    }

    /// Current contents of the slot for `kind`
    pub async fn slot(&self, kind: ActionKind) -> SlotState {
        self.slot_for(kind).state.read().await.clone()
    }

    /// Move the session to `chain_id`, skipping the request when already there
    pub async fn switch_chain(&self, chain_id: ChainId) -> Result<ActionResult, ActionError> {
        self.run(ActionKind::SwitchChain, async {
            self.check_chain(chain_id)?;
            let check = self.guard.ensure_chain(chain_id).await?;
            Ok(ActionResult::ChainSelected {
                chain_id,
                switched: check.switched(),
            })
        })
        .await
    }

    pub async fn sign_message(
        &self,
        message: impl Into<String>,
    ) -> Result<ActionResult, ActionError> {
        let request = OperationRequest::SignMessage {
            message: message.into(),
        };
        self.run(ActionKind::SignMessage, self.operate(request)).await
    }

    pub async fn sign_typed_data(
        &self,
        payload: TypedDataPayload,
    ) -> Result<ActionResult, ActionError> {
        let request = OperationRequest::SignTypedData {
            payload: Box::new(payload),
        };
        self.run(ActionKind::SignTypedData, self.operate(request)).await
    }

    /// Send a transaction on whatever chain the session is on
    pub async fn send_transaction(
        &self,
        tx: TransactionRequest,
    ) -> Result<ActionResult, ActionError> {
        let request = OperationRequest::SendTransaction { tx };
        self.run(ActionKind::SendTransaction, self.operate(request)).await
    }

    /// Send a transaction after making sure the session is on `chain_id`
    pub async fn send_transaction_on(
        &self,
        chain_id: ChainId,
        tx: TransactionRequest,
    ) -> Result<ActionResult, ActionError> {
        self.run(ActionKind::SendTransaction, async {
            self.check_chain(chain_id)?;
            self.guard.ensure_chain(chain_id).await?;
            self.operate(OperationRequest::SendTransaction { tx }).await
        })
        .await
    }

    pub async fn sign_in(&self, request: SignInRequest) -> Result<ActionResult, ActionError> {
        self.run(
            ActionKind::SignIn,
            self.operate(OperationRequest::SignIn { request }),
        )
        .await
    }

    /// Submit calls as an atomic batch on the default chain and resolve it
    pub async fn send_batch(&self, calls: Vec<Call>) -> Result<ActionResult, ActionError> {
        self.run(ActionKind::SendBatch, async {
            self.guard.ensure_chain(self.config.default_chain).await?;

            let submission = self
                .batches
                .submit(&calls)
                .await
                .map_err(|e| e.into_action_error(ActionPhase::Submission))?;
            self.submitted
                .write()
                .await
                .insert(submission.batch_id.clone(), submission.call_count);

            let resolved = self
                .batches
                .resolve(&submission.batch_id, submission.call_count)
                .await;
            self.track_batch(&submission.batch_id, submission.call_count, &resolved).await;
            Ok(ActionResult::Batch(resolved?))
        })
        .await
    }

    /// Re-run status resolution for a batch submitted earlier
    ///
    /// Accepts batches from `send_batch` and swap batches whose status was
    /// left unresolved, until a final status has been observed.
    pub async fn resolve_batch(&self, batch_id: BatchId) -> Result<ActionResult, ActionError> {
        self.run(ActionKind::SendBatch, async {
            let call_count = self
                .submitted
                .read()
                .await
                .get(&batch_id)
                .copied()
                .ok_or_else(|| {
                    ActionError::invalid_request(
                        ActionPhase::Resolution,
                        format!("batch {batch_id} was not submitted by this controller"),
                    )
                })?;

            let resolved = self.batches.resolve(&batch_id, call_count).await;
            self.track_batch(&batch_id, call_count, &resolved).await;
            Ok(ActionResult::Batch(resolved?))
        })
        .await
    }

    /// Plan and execute a swap on the default chain
    pub async fn swap(&self, params: SwapParams) -> Result<ActionResult, ActionError> {
        self.run(ActionKind::Swap, async {
            let swaps = self.swaps.as_ref().ok_or_else(|| {
                ActionError::invalid_request(
                    ActionPhase::Precondition,
                    "no route planner configured",
                )
            })?;

            self.guard.ensure_chain(self.config.default_chain).await?;
            let result = swaps.execute(&params).await;
            if let Err(err) = &result {
                if let SwapErrorKind::BatchUnresolved {
                    batch_id,
                    call_count,
                    ..
                } = &err.kind
                {
                    self.submitted
                        .write()
                        .await
                        .insert(batch_id.clone(), *call_count);
                }
            }
            Ok(ActionResult::Swap(result?))
        })
        .await
    }

    /// Wait for the receipt of the transaction published in `kind`'s slot
    ///
    /// The receipt status is written back only if the slot still holds the
    /// same invocation; a newer result is left alone.
    pub async fn await_receipt(&self, kind: ActionKind) -> Result<Receipt, ActionError> {
        let watcher = self.receipts.as_ref().ok_or_else(|| {
            ActionError::invalid_request(ActionPhase::Confirming, "no receipt watcher configured")
        })?;

        let (invocation_id, hash) = self.pending_transaction(kind).await?;
        info!(action = %kind, invocation_id, tx_hash = %hash, "Waiting for receipt");

        let receipt = watcher.wait_for_receipt(hash).await.map_err(|e| {
            OperationError::from(e).into_action_error(ActionPhase::Confirming)
        })?;
        self.metrics.record_receipt(receipt.status);

        let mut state = self.slot_for(kind).state.write().await;
        if let SlotState::Succeeded {
            invocation_id: current,
            result,
        } = &mut *state
        {
            if *current == invocation_id {
                if let Some(tx) = result.transaction_mut() {
                    tx.receipt_status = Some(receipt.status);
                }
            }
        }

        info!(
            action = %kind,
            tx_hash = %hash,
            status = ?receipt.status,
            block = receipt.block_number,
            "Receipt observed"
        );
        Ok(receipt)
    }

    async fn pending_transaction(&self, kind: ActionKind) -> Result<(u64, TxHash), ActionError> {
        match &*self.slot_for(kind).state.read().await {
            SlotState::Succeeded {
                invocation_id,
                result,
            } => result
                .transaction_hash()
                .map(|hash| (*invocation_id, hash))
                .ok_or_else(|| {
                    ActionError::invalid_request(
                        ActionPhase::Confirming,
                        format!("{kind} result has no transaction"),
                    )
                }),
            _ => Err(ActionError::invalid_request(
                ActionPhase::Confirming,
                format!("{kind} has no successful result"),
            )),
        }
    }

    async fn operate(&self, request: OperationRequest) -> Result<ActionResult, ActionError> {
        let phase = match request {
            OperationRequest::SignIn { .. } => ActionPhase::Precondition,
            _ => ActionPhase::Submission,
        };
        self.operations
            .execute(request)
            .await
            .map_err(|e| e.into_action_error(phase))
    }

    fn check_chain(&self, chain_id: ChainId) -> Result<(), ActionError> {
        if chain_id == 0 {
            return Err(ActionError::invalid_request(
                ActionPhase::Precondition,
                "chain id must be positive",
            ));
        }
        if !self.config.allows_chain(chain_id) {
            return Err(ActionError::invalid_request(
                ActionPhase::Precondition,
                format!("chain {chain_id} is not configured"),
            ));
        }
        Ok(())
    }

    /// Keep a batch available to `resolve_batch` until its status is final
    async fn track_batch(
        &self,
        batch_id: &BatchId,
        call_count: usize,
        resolved: &Result<BatchResult, BatchError>,
    ) {
        let mut submitted = self.submitted.write().await;
        match resolved {
            Ok(result) if result.final_status.is_final() => {
                submitted.remove(batch_id);
            }
            _ => {
                submitted.insert(batch_id.clone(), call_count);
            }
        }
    }

    fn slot_for(&self, kind: ActionKind) -> &Slot {
        &self.slots[kind as usize]
    }

    /// Common envelope: take the slot, clear it, run, publish one outcome
    async fn run<F>(&self, kind: ActionKind, action: F) -> Result<ActionResult, ActionError>
    where
        F: Future<Output = Result<ActionResult, ActionError>>,
    {
        let slot = self.slot_for(kind);
        let _running = match self.config.in_flight_policy {
            InFlightPolicy::Queue => slot.running.lock().await,
            InFlightPolicy::Reject => match slot.running.try_lock() {
                Ok(guard) => guard,
                Err(_) => {
                    warn!(action = %kind, "Action already in flight, rejecting");
                    self.metrics
                        .record_action_outcome(kind, ActionOutcome::Rejected);
                    return Err(ActionError::new(
                        ActionErrorKind::ActionInFlight,
                        ActionPhase::Precondition,
                        format!("{kind} is already running"),
                    ));
                }
            },
        };

        let invocation_id = self.invocations.fetch_add(1, Ordering::SeqCst) + 1;
        *slot.state.write().await = SlotState::Running { invocation_id };
        self.metrics.record_action_started(kind);

        let span = ActionSpan::new(kind, invocation_id);
        let started = Instant::now();
        let result = action.instrument(span.span()).await;

        let (state, outcome) = match &result {
            Ok(value) => {
                info!(
                    action = %kind,
                    invocation_id,
                    correlation_id = %span.correlation_id,
                    "Action succeeded"
                );
                (
                    SlotState::Succeeded {
                        invocation_id,
                        result: value.clone(),
                    },
                    ActionOutcome::Succeeded,
                )
            }
            Err(err) => {
                error!(
                    action = %kind,
                    error_kind = err.kind.as_str(),
                    phase = %err.phase,
                    invocation_id,
                    correlation_id = %span.correlation_id,
                    error = %err.message,
                    "Action failed"
                );
                (
                    SlotState::Failed {
                        invocation_id,
                        error: err.clone(),
                    },
                    ActionOutcome::Failed,
                )
            }
        };

        *slot.state.write().await = state;
        self.metrics
            .record_action_finished(kind, outcome, started.elapsed());
        result
    }
}

/// Builder for ActionController
pub struct ActionControllerBuilder {
    session: Option<Arc<dyn WalletSession>>,
    verifier: Option<Arc<dyn SignatureVerifier>>,
    planner: Option<Arc<dyn RoutePlanner>>,
    multicall: Option<Arc<dyn MulticallExecutor>>,
    receipts: Option<Arc<dyn ReceiptWatcher>>,
    approval_gate: Option<Arc<dyn ApprovalGate>>,
    clock: Option<Arc<dyn Clock>>,
    config: OrchestratorConfig,
}

impl ActionControllerBuilder {
    pub fn new() -> Self {
        Self {
            session: None,
            verifier: None,
            planner: None,
            multicall: None,
            receipts: None,
            approval_gate: None,
            clock: None,
            config: OrchestratorConfig::default(),
        }
    }

    pub fn session(mut self, session: Arc<dyn WalletSession>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn route_planner(mut self, planner: Arc<dyn RoutePlanner>) -> Self {
        self.planner = Some(planner);
        self
    }

    pub fn multicall_executor(mut self, executor: Arc<dyn MulticallExecutor>) -> Self {
        self.multicall = Some(executor);
        self
    }

    pub fn receipt_watcher(mut self, watcher: Arc<dyn ReceiptWatcher>) -> Self {
        self.receipts = Some(watcher);
        self
    }

    pub fn approval_gate(mut self, gate: Arc<dyn ApprovalGate>) -> Self {
        self.approval_gate = Some(gate);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ActionController, BuilderError> {
        let session = self.session.ok_or_else(|| BuilderError::MissingField {
            field: "session".to_string(),
        })?;
        if self.config.default_chain == 0 {
            return Err(BuilderError::InvalidConfig(
                "default chain must be positive".to_string(),
            ));
        }
        if !self.config.allows_chain(self.config.default_chain) {
            return Err(BuilderError::InvalidConfig(format!(
                "default chain {} is not among the known chains",
                self.config.default_chain
            )));
        }

        let verifier = self
            .verifier
            .unwrap_or_else(|| Arc::new(EcdsaVerifier));

        let multicall = self.multicall.or_else(|| {
            self.config.swap.router.map(|router| {
                Arc::new(RouterMulticallExecutor::new(router)) as Arc<dyn MulticallExecutor>
            })
        });

        let swaps = match (self.planner, multicall) {
            (Some(planner), Some(multicall)) => {
                let mut swaps = SwapOrchestrator::new(
                    session.clone(),
                    planner,
                    multicall,
                    self.config.swap.clone(),
                )
                .with_force_atomic(self.config.force_atomic)
                .with_clock(self.clock.unwrap_or_else(|| Arc::new(SystemClock)));
                if let Some(gate) = self.approval_gate {
                    swaps = swaps.with_approval_gate(gate);
                }
                Some(swaps)
            }
            (Some(_), None) => {
                return Err(BuilderError::MissingField {
                    field: "multicall_executor or swap.router".to_string(),
                })
            }
            (None, _) => None,
        };

        Ok(ActionController {
            guard: ChainGuard::new(session.clone()),
            operations: OperationExecutor::new(session.clone(), verifier),
            batches: AtomicBatchExecutor::new(session.clone(), self.config.force_atomic),
            session,
            swaps,
            receipts: self.receipts,
            config: self.config,
            slots: Default::default(),
            invocations: AtomicU64::new(0),
            submitted: RwLock::new(HashMap::new()),
            metrics: MetricsCollector::new(),
        })
    }
}

impl Default for ActionControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
