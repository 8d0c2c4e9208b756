use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wallet_actions::orchestrator::{
    ApprovalGate, ChainCheck, ChainGuard, ManualClock, SwapSettings,
};
use wallet_actions::router::{MockMulticallExecutor, MockRoutePlanner, PlanningError};
use wallet_actions::session::{
    EcdsaVerifier, MockBehavior, MockReceiptWatcher, MockWallet, SessionError,
    SignatureVerifier, WalletCall,
};
use wallet_actions::types::{
    address_from_private_key, Address, ApprovalPolicy, ApprovalRequirement, BatchStatus, Call,
    CallOutcome, InFlightPolicy, ReceiptStatus, ResolutionPath, RoutePlan, Signature,
    TransactionRequest, U256,
};
use wallet_actions::{
    ActionController, ActionErrorKind, ActionKind, ActionResult, OrchestratorConfig, SlotState,
    SwapParams,
};

// ═══════════════════════════════════════════════════════════════════════════
// FIXTURES
// ═══════════════════════════════════════════════════════════════════════════

const KEY_A: [u8; 32] = [0x11; 32];
const KEY_B: [u8; 32] = [0x22; 32];
const BASE: u64 = 8453;
const NOW: u64 = 1_700_000_000;

fn router() -> Address {
    "0x6ff5693b99212da76ad316178a184ab56d299b43".parse().unwrap()
}

fn usdc() -> Address {
    "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913".parse().unwrap()
}

fn weth() -> Address {
    "0x4200000000000000000000000000000000000006".parse().unwrap()
}

fn swap_params() -> SwapParams {
    SwapParams::new(usdc(), weth(), U256::from(1_000_000u64))
        .with_min_amount_out(U256::from(300_000_000_000_000u64))
}

fn route_plan(approvals: usize) -> RoutePlan {
    RoutePlan {
        steps: Vec::new(),
        calls: vec![
            Call::new(router()).with_data(vec![0x04, 0xe4, 0x5a, 0xaf]),
            Call::new(router()).with_data(vec![0x49, 0x40, 0x4b, 0x7c]),
        ],
        required_approvals: (0..approvals)
            .map(|_| ApprovalRequirement {
                token: usdc(),
                spender: router(),
                amount: U256::from(1_000_000u64),
                call: Call::new(usdc()).with_data(vec![0x09, 0x5e, 0xa7, 0xb3]),
            })
            .collect(),
        total_value: U256::ZERO,
    }
}

fn config(approval_policy: ApprovalPolicy, in_flight_policy: InFlightPolicy) -> OrchestratorConfig {
    OrchestratorConfig {
        default_chain: BASE,
        known_chains: vec![1, BASE],
        force_atomic: true,
        in_flight_policy,
        swap: SwapSettings {
            router: Some(router()),
            deadline_secs: 600,
            approval_policy,
        },
    }
}

/// Approval gate answering a fixed decision and counting prompts
struct CountingGate {
    accept: bool,
    prompts: AtomicUsize,
}

impl CountingGate {
    fn new(accept: bool) -> Self {
        Self {
            accept,
            prompts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ApprovalGate for CountingGate {
    async fn confirm(&self, _approvals: &[ApprovalRequirement]) -> bool {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.accept
    }
}

struct SwapHarness {
    wallet: Arc<MockWallet>,
    planner: Arc<MockRoutePlanner>,
    executor: Arc<MockMulticallExecutor>,
    controller: ActionController,
}

fn swap_harness(
    plan: RoutePlan,
    policy: ApprovalPolicy,
    gate: Option<Arc<CountingGate>>,
) -> SwapHarness {
    let wallet = Arc::new(MockWallet::new(KEY_A, BASE).unwrap());
    let planner = Arc::new(MockRoutePlanner::new(plan));
    let executor = Arc::new(MockMulticallExecutor::new());
    let mut builder = ActionController::builder()
        .session(wallet.clone())
        .route_planner(planner.clone())
        .multicall_executor(executor.clone())
        .clock(Arc::new(ManualClock::new(NOW)))
        .config(config(policy, InFlightPolicy::Queue));
    if let Some(gate) = gate {
        builder = builder.approval_gate(gate);
    }

    SwapHarness {
        wallet,
        planner,
        executor,
        controller: builder.build().unwrap(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SCENARIO A: CHAIN FAST PATH
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_scenario_a_already_on_required_chain() {
    let wallet = Arc::new(MockWallet::new(KEY_A, BASE).unwrap());
    let guard = ChainGuard::new(wallet.clone());

    assert_eq!(guard.ensure_chain(BASE).await.unwrap(), ChainCheck::AlreadyActive);
    assert_eq!(
        wallet
            .count_calls(|c| matches!(c, WalletCall::SwitchChain(_)))
            .await,
        0
    );
}

#[tokio::test]
async fn test_chain_dependent_actions_skip_switch_on_base() {
    let wallet = Arc::new(MockWallet::new(KEY_A, BASE).unwrap());
    let controller = ActionController::builder()
        .session(wallet.clone())
        .config(config(ApprovalPolicy::Block, InFlightPolicy::Queue))
        .build()
        .unwrap();

    controller
        .send_transaction_on(BASE, TransactionRequest::new(Address::repeat_byte(1)))
        .await
        .unwrap();
    controller
        .send_batch(vec![Call::new(Address::repeat_byte(2))])
        .await
        .unwrap();
    controller.switch_chain(BASE).await.unwrap();

    assert_eq!(
        wallet
            .count_calls(|c| matches!(c, WalletCall::SwitchChain(_)))
            .await,
        0
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// SCENARIO B: BATCH STATUS FALLBACK
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_scenario_b_wait_timeout_uses_single_status_query() {
    let wallet = Arc::new(MockWallet::new(KEY_A, BASE).unwrap());
    wallet
        .set_behavior(MockBehavior {
            wait_response: Err(SessionError::Timeout("wallet_waitForCallsStatus".into())),
            status_response: Ok(100),
            ..Default::default()
        })
        .await;
    let controller = ActionController::builder()
        .session(wallet.clone())
        .build()
        .unwrap();

    let calls = (1..=4u8)
        .map(|i| Call::new(Address::repeat_byte(i)).with_value(U256::from(i)))
        .collect();
    let result = controller.send_batch(calls).await.unwrap();

    let ActionResult::Batch(batch) = result else {
        panic!("expected batch result");
    };
    assert_eq!(batch.final_status, BatchStatus::Pending);
    assert_eq!(batch.resolved_via, ResolutionPath::Fallback);
    assert_eq!(batch.per_call_outcome, vec![CallOutcome::Pending; 4]);
    assert_eq!(
        wallet
            .count_calls(|c| matches!(c, WalletCall::GetBatchStatus(_)))
            .await,
        1
    );
    assert_eq!(
        wallet
            .count_calls(|c| matches!(
                c,
                WalletCall::SubmitAtomicBatch { calls, atomic: true } if calls.len() == 4
            ))
            .await,
        1
    );
}

#[tokio::test]
async fn test_primary_success_never_queries_status() {
    let wallet = Arc::new(MockWallet::new(KEY_A, BASE).unwrap());
    let controller = ActionController::builder()
        .session(wallet.clone())
        .build()
        .unwrap();

    let result = controller
        .send_batch(vec![Call::new(Address::repeat_byte(1)); 3])
        .await
        .unwrap();

    let ActionResult::Batch(batch) = result else {
        panic!("expected batch result");
    };
    assert_eq!(batch.final_status, BatchStatus::Confirmed);
    assert_eq!(batch.resolved_via, ResolutionPath::Primary);
    assert_eq!(
        wallet
            .count_calls(|c| matches!(c, WalletCall::GetBatchStatus(_)))
            .await,
        0
    );
}

#[tokio::test]
async fn test_both_status_paths_failing_is_unresolved() {
    let wallet = Arc::new(MockWallet::new(KEY_A, BASE).unwrap());
    wallet
        .set_behavior(MockBehavior {
            wait_response: Err(SessionError::Unsupported("wait".into())),
            status_response: Err(SessionError::Transport("connection reset".into())),
            ..Default::default()
        })
        .await;
    let controller = ActionController::builder()
        .session(wallet.clone())
        .build()
        .unwrap();

    let err = controller
        .send_batch(vec![Call::new(Address::repeat_byte(1)); 2])
        .await
        .unwrap_err();

    let submitted = wallet
        .calls()
        .await
        .into_iter()
        .find_map(|c| match c {
            WalletCall::WaitForBatchStatus(id) => Some(id),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        err.kind,
        ActionErrorKind::StatusUnresolved {
            batch_id: submitted
        }
    );
    assert_eq!(
        wallet
            .count_calls(|c| matches!(c, WalletCall::GetBatchStatus(_)))
            .await,
        1
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// SCENARIO C: SIGNATURE VERIFICATION
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_scenario_c_verification_by_address() {
    let wallet = Arc::new(MockWallet::new(KEY_A, BASE).unwrap());
    let controller = ActionController::builder()
        .session(wallet.clone())
        .build()
        .unwrap();

    let result = controller.sign_message("Hello, world!").await.unwrap();
    let ActionResult::Signature {
        value, verified, ..
    } = result
    else {
        panic!("expected signature result");
    };
    assert_eq!(verified, Some(true));

    let address_a = wallet.address();
    let address_b = address_from_private_key(&KEY_B).unwrap();
    assert_ne!(address_a, address_b);

    let verifier = EcdsaVerifier;
    assert!(verifier
        .verify_message(address_a, "Hello, world!", &value)
        .await
        .unwrap());
    assert!(!verifier
        .verify_message(address_b, "Hello, world!", &value)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_foreign_signature_does_not_verify() {
    let signer = MockWallet::new(KEY_B, BASE).unwrap();
    let foreign: Signature = {
        use wallet_actions::session::WalletSession;
        signer.sign_message("Hello, world!").await.unwrap()
    };

    let verifier = EcdsaVerifier;
    let address_a = address_from_private_key(&KEY_A).unwrap();
    assert_eq!(
        verifier
            .verify_message(address_a, "Hello, world!", &foreign)
            .await,
        Ok(false)
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// SWAP FLOW
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_swap_planning_failure_submits_nothing() {
    let harness = swap_harness(route_plan(0), ApprovalPolicy::Bundle, None);
    harness
        .planner
        .set_response(Err(PlanningError::NoViableRoute))
        .await;

    let err = harness.controller.swap(swap_params()).await.unwrap_err();

    assert_eq!(err.kind, ActionErrorKind::PlanningError);
    assert!(harness.executor.requests().await.is_empty());
    assert!(harness.wallet.calls().await.is_empty());
}

#[tokio::test]
async fn test_swap_with_approvals_blocked_by_default() {
    let harness = swap_harness(route_plan(1), ApprovalPolicy::Block, None);

    let err = harness.controller.swap(swap_params()).await.unwrap_err();

    assert_eq!(
        err.kind,
        ActionErrorKind::UnhandledApprovalRequirement { count: 1 }
    );
    assert!(harness.executor.requests().await.is_empty());
}

#[tokio::test]
async fn test_swap_bundles_approvals_ahead_of_route() {
    let harness = swap_harness(route_plan(1), ApprovalPolicy::Bundle, None);

    let result = harness.controller.swap(swap_params()).await.unwrap();

    let ActionResult::Swap(swap) = result else {
        panic!("expected swap result");
    };
    assert_eq!(swap.approvals_bundled, 1);
    let requests = harness.executor.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].calls.len(), 3);
    assert_eq!(requests[0].calls[0].to, usdc());
    assert_eq!(requests[0].account, harness.wallet.address());
    assert_eq!(requests[0].deadline, Some(NOW + 600));
}

#[tokio::test]
async fn test_swap_confirm_policy() {
    let refusing = Arc::new(CountingGate::new(false));
    let harness = swap_harness(route_plan(2), ApprovalPolicy::Confirm, Some(refusing.clone()));
    let err = harness.controller.swap(swap_params()).await.unwrap_err();
    assert_eq!(
        err.kind,
        ActionErrorKind::UnhandledApprovalRequirement { count: 2 }
    );
    assert_eq!(refusing.prompts.load(Ordering::SeqCst), 1);
    assert!(harness.executor.requests().await.is_empty());

    let accepting = Arc::new(CountingGate::new(true));
    let harness = swap_harness(route_plan(2), ApprovalPolicy::Confirm, Some(accepting.clone()));
    harness.controller.swap(swap_params()).await.unwrap();
    assert_eq!(accepting.prompts.load(Ordering::SeqCst), 1);
    assert_eq!(harness.executor.requests().await[0].calls.len(), 4);
}

#[tokio::test]
async fn test_swap_through_router_multicall() {
    let wallet = Arc::new(MockWallet::new(KEY_A, BASE).unwrap());
    let controller = ActionController::builder()
        .session(wallet.clone())
        .route_planner(Arc::new(MockRoutePlanner::new(route_plan(1))))
        .config(config(ApprovalPolicy::Bundle, InFlightPolicy::Queue))
        .build()
        .unwrap();

    let result = controller.swap(swap_params()).await.unwrap();
    assert!(result.transaction_hash().is_some());

    // approval + packed router call as one atomic batch
    let batches: Vec<Vec<Call>> = wallet
        .calls()
        .await
        .into_iter()
        .filter_map(|c| match c {
            WalletCall::SubmitAtomicBatch { calls, atomic: true } => Some(calls),
            _ => None,
        })
        .collect();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 2);
    assert_eq!(batches[0][0].to, usdc());
    assert_eq!(batches[0][1].to, router());
}

#[tokio::test]
async fn test_router_swap_batch_unresolved_then_resolved() {
    let wallet = Arc::new(MockWallet::new(KEY_A, BASE).unwrap());
    wallet
        .set_behavior(MockBehavior {
            wait_response: Err(SessionError::Timeout("wallet_waitForCallsStatus".into())),
            status_response: Err(SessionError::Transport("rpc down".into())),
            ..Default::default()
        })
        .await;
    let controller = ActionController::builder()
        .session(wallet.clone())
        .route_planner(Arc::new(MockRoutePlanner::new(route_plan(1))))
        .config(config(ApprovalPolicy::Bundle, InFlightPolicy::Queue))
        .build()
        .unwrap();

    let err = controller.swap(swap_params()).await.unwrap_err();

    let submitted = wallet
        .calls()
        .await
        .into_iter()
        .find_map(|c| match c {
            WalletCall::WaitForBatchStatus(id) => Some(id),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        err.kind,
        ActionErrorKind::StatusUnresolved {
            batch_id: submitted.clone()
        }
    );
    assert_eq!(
        wallet
            .count_calls(|c| matches!(c, WalletCall::GetBatchStatus(_)))
            .await,
        1
    );

    wallet.set_behavior(MockBehavior::default()).await;
    let result = controller.resolve_batch(submitted).await.unwrap();
    let ActionResult::Batch(batch) = result else {
        panic!("expected batch result");
    };
    assert_eq!(batch.final_status, BatchStatus::Confirmed);
}

#[tokio::test]
async fn test_router_swap_failed_batch_is_not_success() {
    let wallet = Arc::new(MockWallet::new(KEY_A, BASE).unwrap());
    wallet
        .set_behavior(MockBehavior {
            wait_response: Ok(500),
            ..Default::default()
        })
        .await;
    let controller = ActionController::builder()
        .session(wallet.clone())
        .route_planner(Arc::new(MockRoutePlanner::new(route_plan(1))))
        .config(config(ApprovalPolicy::Bundle, InFlightPolicy::Queue))
        .build()
        .unwrap();

    let err = controller.swap(swap_params()).await.unwrap_err();

    assert!(matches!(err.kind, ActionErrorKind::BatchFailed { .. }));
    assert!(matches!(
        controller.slot(ActionKind::Swap).await,
        SlotState::Failed { .. }
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// CONTROLLER ENVELOPE
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_reject_policy_reports_in_flight() {
    let wallet = Arc::new(MockWallet::new(KEY_A, BASE).unwrap());
    wallet
        .set_behavior(MockBehavior {
            send_delay: Some(Duration::from_millis(50)),
            ..Default::default()
        })
        .await;
    let controller = ActionController::builder()
        .session(wallet.clone())
        .config(config(ApprovalPolicy::Block, InFlightPolicy::Reject))
        .build()
        .unwrap();

    let tx = TransactionRequest::new(Address::repeat_byte(9));
    let (first, second) = futures::future::join(
        controller.send_transaction(tx.clone()),
        controller.send_transaction(tx),
    )
    .await;

    assert!(first.is_ok());
    assert_eq!(second.unwrap_err().kind, ActionErrorKind::ActionInFlight);
    assert!(matches!(
        controller.slot(ActionKind::SendTransaction).await,
        SlotState::Succeeded { .. }
    ));
}

#[tokio::test]
async fn test_receipt_does_not_overwrite_newer_invocation() {
    let wallet = Arc::new(MockWallet::new(KEY_A, BASE).unwrap());
    let watcher = Arc::new(MockReceiptWatcher::new().with_delay(Duration::from_millis(50)));
    let controller = Arc::new(
        ActionController::builder()
            .session(wallet.clone())
            .receipt_watcher(watcher.clone())
            .build()
            .unwrap(),
    );

    let first = controller
        .send_transaction(TransactionRequest::new(Address::repeat_byte(1)))
        .await
        .unwrap();
    watcher
        .set_response(first.transaction_hash().unwrap(), Ok(ReceiptStatus::Reverted))
        .await;

    let waiting = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.await_receipt(ActionKind::SendTransaction).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    let second = controller
        .send_transaction(TransactionRequest::new(Address::repeat_byte(2)))
        .await
        .unwrap();

    let receipt = waiting.await.unwrap().unwrap();
    assert_eq!(receipt.status, ReceiptStatus::Reverted);
    assert_eq!(receipt.transaction_hash, first.transaction_hash().unwrap());

    let slot = controller.slot(ActionKind::SendTransaction).await;
    match slot.result() {
        Some(ActionResult::Transaction(tx)) => {
            assert_eq!(Some(tx.hash), second.transaction_hash());
            assert_eq!(tx.receipt_status, None);
        }
        other => panic!("unexpected slot: {other:?}"),
    }
}

#[tokio::test]
async fn test_action_result_serializes_with_type_tag() {
    let wallet = Arc::new(MockWallet::new(KEY_A, BASE).unwrap());
    let controller = ActionController::builder()
        .session(wallet)
        .build()
        .unwrap();

    let result = controller.switch_chain(BASE).await.unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["type"], "chain_selected");
    assert_eq!(json["chain_id"], BASE);
}
