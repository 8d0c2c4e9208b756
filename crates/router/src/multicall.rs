use alloy_dyn_abi::DynSolValue;
use alloy_primitives::keccak256;
use async_trait::async_trait;
use tracing::{debug, info};
use wallet_actions_session::WalletSession;
use wallet_actions_types::{Address, Bytes, Call, TransactionRequest, TxHash, U256};

use crate::{MulticallExecutor, MulticallRequest, PlanningError};

pub const MULTICALL_SIGNATURE: &str = "multicall(bytes[])";

/// Executes route calls through the router's `multicall(bytes[])` entry point
///
/// Calls addressed to the router are packed into one router transaction that
/// carries the native value. Calls to other contracts (token approvals) may
/// only precede the router calls; when present, the approvals and the packed
/// router call go to the wallet as one atomic batch.
pub struct RouterMulticallExecutor {
    router: Address,
}

impl RouterMulticallExecutor {
    pub fn new(router: Address) -> Self {
        Self { router }
    }

    pub fn router(&self) -> Address {
        self.router
    }

    /// ABI-encode router calls as `multicall(bytes[])` calldata
    pub fn encode_multicall(&self, calls: &[Call]) -> Result<Bytes, PlanningError> {
        if let Some(call) = calls.iter().find(|c| c.to != self.router) {
            return Err(PlanningError::InvalidRequest {
                reason: format!(
                    "call to {} is not addressed to router {}",
                    call.to, self.router
                ),
            });
        }
        if calls.iter().any(|c| !c.value.is_zero()) {
            return Err(PlanningError::InvalidRequest {
                reason: "router calls must not carry value; attach it to the multicall".into(),
            });
        }

        let inner = calls
            .iter()
            .map(|c| DynSolValue::Bytes(c.data.to_vec()))
            .collect();
        let params = DynSolValue::Tuple(vec![DynSolValue::Array(inner)]);

        let mut data = keccak256(MULTICALL_SIGNATURE)[..4].to_vec();
        data.extend(params.abi_encode_params());
        Ok(data.into())
    }

    /// Split into leading non-router calls and the router calls that follow
    fn split<'a>(&self, calls: &'a [Call]) -> Result<(&'a [Call], &'a [Call]), PlanningError> {
        let first_router = calls
            .iter()
            .position(|c| c.to == self.router)
            .unwrap_or(calls.len());
        let (prefix, route) = calls.split_at(first_router);
        if route.is_empty() {
            return Err(PlanningError::InvalidRequest {
                reason: "no calls addressed to the router".into(),
            });
        }
        if route.iter().any(|c| c.to != self.router) {
            return Err(PlanningError::InvalidRequest {
                reason: "non-router calls must precede the route".into(),
            });
        }
        Ok((prefix, route))
    }

    fn check_deadline(&self, request: &MulticallRequest) -> Result<(), PlanningError> {
        let now = request
            .now
            .unwrap_or_else(|| chrono::Utc::now().timestamp().max(0) as u64);
        match request.deadline {
            Some(deadline) if now > deadline => {
                Err(PlanningError::DeadlineExceeded { deadline, now })
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl MulticallExecutor for RouterMulticallExecutor {
    async fn prepare_multicall(
        &self,
        request: &MulticallRequest,
    ) -> Result<Vec<Call>, PlanningError> {
        self.check_deadline(request)?;

        let (prefix, route) = self.split(&request.calls)?;
        let router_call = Call::new(self.router)
            .with_data(self.encode_multicall(route)?)
            .with_value(request.value);

        let mut calls = prefix.to_vec();
        calls.push(router_call);
        debug!(
            calls = calls.len(),
            route_calls = route.len(),
            "Router multicall prepared"
        );
        Ok(calls)
    }

    async fn execute_atomic_multicall(
        &self,
        session: &dyn WalletSession,
        request: &MulticallRequest,
    ) -> Result<TxHash, PlanningError> {
        let mut calls = self.prepare_multicall(request).await?;
        if calls.len() != 1 {
            return Err(PlanningError::InvalidRequest {
                reason: format!(
                    "{} approval call(s) must be submitted as an atomic batch",
                    calls.len() - 1
                ),
            });
        }

        let tx = TransactionRequest::from(calls.remove(0));
        let hash = session.send_transaction(&tx).await?;
        info!(tx_hash = %hash, account = %request.account, "Router multicall submitted");
        Ok(hash)
    }
}

/// Total native value carried by a set of calls
pub fn total_value(calls: &[Call]) -> U256 {
    calls.iter().fold(U256::ZERO, |acc, c| acc.saturating_add(c.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallet_actions_session::{MockWallet, WalletCall};

    const KEY: [u8; 32] = [0x42; 32];

    fn router() -> Address {
        Address::repeat_byte(0xee)
    }

    fn route_call(selector: u8) -> Call {
        Call::new(router()).with_data(vec![selector, 0, 0, 1])
    }

    #[test]
    fn test_encode_multicall_layout() {
        let executor = RouterMulticallExecutor::new(router());
        let data = executor.encode_multicall(&[route_call(0xaa)]).unwrap();

        assert_eq!(&data[..4], &keccak256(MULTICALL_SIGNATURE)[..4]);
        // offset, array length, element offset, element length, element data
        assert_eq!(data.len(), 4 + 32 * 5);
        assert_eq!(data[4 + 31], 0x20);
        assert_eq!(data[4 + 32 + 31], 1);
        assert_eq!(data[4 + 32 * 3 + 31], 4);
        assert_eq!(&data[4 + 32 * 4..4 + 32 * 4 + 4], &[0xaa, 0, 0, 1]);
    }

    #[test]
    fn test_encode_rejects_foreign_target() {
        let executor = RouterMulticallExecutor::new(router());
        let foreign = Call::new(Address::repeat_byte(1));
        assert!(matches!(
            executor.encode_multicall(&[foreign]),
            Err(PlanningError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_split_requires_approvals_first() {
        let executor = RouterMulticallExecutor::new(router());
        let approve = Call::new(Address::repeat_byte(1));
        let calls = vec![route_call(1), approve];
        assert!(executor.split(&calls).is_err());
    }

    fn request(calls: Vec<Call>, account: Address) -> MulticallRequest {
        MulticallRequest {
            calls,
            value: U256::ZERO,
            account,
            deadline: None,
            now: None,
        }
    }

    #[tokio::test]
    async fn test_route_only_sends_single_transaction() {
        let wallet = MockWallet::new(KEY, 8453).unwrap();
        let executor = RouterMulticallExecutor::new(router());
        let mut request = request(vec![route_call(1), route_call(2)], wallet.address());
        request.value = U256::from(10_000_000_000_000u64);

        executor
            .execute_atomic_multicall(&wallet, &request)
            .await
            .unwrap();

        let calls = wallet.calls().await;
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            WalletCall::SendTransaction(tx) => {
                assert_eq!(tx.to, router());
                assert_eq!(tx.value, request.value);
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_prepare_keeps_approvals_ahead_of_packed_route() {
        let executor = RouterMulticallExecutor::new(router());
        let approve = Call::new(Address::repeat_byte(1)).with_data(vec![0x09, 0x5e, 0xa7, 0xb3]);
        let mut request = request(
            vec![approve.clone(), route_call(1), route_call(2)],
            Address::repeat_byte(0x42),
        );
        request.value = U256::from(7);

        let calls = executor.prepare_multicall(&request).await.unwrap();

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], approve);
        assert_eq!(calls[1].to, router());
        assert_eq!(calls[1].value, U256::from(7));
        assert_eq!(
            calls[1].data,
            executor
                .encode_multicall(&[route_call(1), route_call(2)])
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_execute_refuses_approval_prefix() {
        let wallet = MockWallet::new(KEY, 8453).unwrap();
        let executor = RouterMulticallExecutor::new(router());
        let request = request(
            vec![Call::new(Address::repeat_byte(1)), route_call(1)],
            wallet.address(),
        );

        let result = executor.execute_atomic_multicall(&wallet, &request).await;
        assert!(matches!(result, Err(PlanningError::InvalidRequest { .. })));
        assert!(wallet.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_expired_deadline_submits_nothing() {
        let wallet = MockWallet::new(KEY, 8453).unwrap();
        let executor = RouterMulticallExecutor::new(router());
        let mut request = request(vec![route_call(1)], wallet.address());
        request.deadline = Some(1);

        let result = executor.execute_atomic_multicall(&wallet, &request).await;
        assert!(matches!(result, Err(PlanningError::DeadlineExceeded { .. })));
        assert!(wallet.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_deadline_checked_against_supplied_time() {
        let executor = RouterMulticallExecutor::new(router());
        let mut request = request(vec![route_call(1)], Address::repeat_byte(0x42));
        // far in the past by the system clock, still open at the supplied time
        request.deadline = Some(1_000);
        request.now = Some(999);
        assert!(executor.prepare_multicall(&request).await.is_ok());

        request.now = Some(1_001);
        assert_eq!(
            executor.prepare_multicall(&request).await,
            Err(PlanningError::DeadlineExceeded {
                deadline: 1_000,
                now: 1_001
            })
        );
    }

    #[test]
    fn test_total_value() {
        let calls = vec![
            Call::new(router()).with_value(U256::from(2)),
            Call::new(router()).with_value(U256::from(3)),
        ];
        assert_eq!(total_value(&calls), U256::from(5));
    }
}
