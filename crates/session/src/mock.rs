use alloy_primitives::keccak256;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use wallet_actions_types::{
    address_from_private_key, hash_message, hash_typed_data, sign_prehash, Address, BatchId,
    BatchStatusReport, Call, CallReceipt, ChainId, Receipt, ReceiptStatus, SessionCapabilities,
    SessionSnapshot, SignInAssertion, SignInRequest, Signature, TransactionRequest, TxHash,
    TypedDataPayload, VerificationError,
};

use crate::{ReceiptWatcher, SessionError, SessionState, WalletSession};

/// Request received by [`MockWallet`]
#[derive(Debug, Clone, PartialEq)]
pub enum WalletCall {
    Connect,
    Disconnect,
    SwitchChain(ChainId),
    SignMessage(String),
    SignTypedData(Box<TypedDataPayload>),
    SendTransaction(TransactionRequest),
    SubmitAtomicBatch { calls: Vec<Call>, atomic: bool },
    WaitForBatchStatus(BatchId),
    GetBatchStatus(BatchId),
    SignIn(SignInRequest),
}

/// Scripted answers for [`MockWallet`]
#[derive(Debug, Clone)]
pub struct MockBehavior {
    pub switch_error: Option<SessionError>,
    /// Accept chain switches without changing the active chain
    pub ignore_switch: bool,
    pub sign_error: Option<SessionError>,
    pub send_error: Option<SessionError>,
    pub batch_error: Option<SessionError>,
    /// Status code returned by the blocking wait, or its failure
    pub wait_response: Result<u16, SessionError>,
    /// Status code returned by the point-in-time query, or its failure
    pub status_response: Result<u16, SessionError>,
    /// Delay applied before answering transaction submissions
    pub send_delay: Option<Duration>,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            switch_error: None,
            ignore_switch: false,
            sign_error: None,
            send_error: None,
            batch_error: None,
            wait_response: Ok(200),
            status_response: Ok(200),
            send_delay: None,
        }
    }
}

/// In-memory wallet for testing
///
/// Signs with a real secp256k1 key so signatures verify, and records every
/// request it receives.
pub struct MockWallet {
    state: SessionState,
    private_key: [u8; 32],
    address: Address,
    home_chain: ChainId,
    behavior: RwLock<MockBehavior>,
    calls: Arc<Mutex<Vec<WalletCall>>>,
    nonce: AtomicU64,
}

impl MockWallet {
    /// Wallet already connected on `chain_id`
    pub fn new(private_key: [u8; 32], chain_id: ChainId) -> Result<Self, VerificationError> {
        let address = address_from_private_key(&private_key)?;
        Ok(Self {
            state: SessionState::from_snapshot(SessionSnapshot::connected(
                vec![address],
                chain_id,
            )),
            private_key,
            address,
            home_chain: chain_id,
            behavior: RwLock::new(MockBehavior::default()),
            calls: Arc::new(Mutex::new(Vec::new())),
            nonce: AtomicU64::new(0),
        })
    }

    /// Wallet that has not connected yet
    pub fn disconnected(
        private_key: [u8; 32],
        chain_id: ChainId,
    ) -> Result<Self, VerificationError> {
        let wallet = Self::new(private_key, chain_id)?;
        Ok(Self {
            state: SessionState::new(),
            ..wallet
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.write().await = behavior;
    }

    pub async fn set_capabilities(&self, capabilities: SessionCapabilities) {
        let snapshot = self.state.snapshot().await;
        self.state
            .mark_connected(snapshot.addresses, snapshot.active_chain_id, capabilities)
            .await;
    }

    /// Requests received so far, in order
    pub async fn calls(&self) -> Vec<WalletCall> {
        self.calls.lock().await.clone()
    }

    pub async fn count_calls(&self, matches: impl Fn(&WalletCall) -> bool) -> usize {
        self.calls.lock().await.iter().filter(|c| matches(c)).count()
    }

    async fn record(&self, call: WalletCall) {
        self.calls.lock().await.push(call);
    }

    async fn behavior(&self) -> MockBehavior {
        self.behavior.read().await.clone()
    }

    fn next_hash(&self, tag: &str) -> TxHash {
        let n = self.nonce.fetch_add(1, Ordering::SeqCst);
        keccak256(format!("{tag}-{}-{n}", self.address))
    }

    fn sign(&self, prehash: &TxHash) -> Result<Signature, SessionError> {
        sign_prehash(prehash, &self.private_key)
            .map_err(|e| SessionError::Transport(e.to_string()))
    }

    fn report(&self, id: &BatchId, code: u16) -> BatchStatusReport {
        let receipts = match code {
            200..=299 => vec![CallReceipt {
                transaction_hash: keccak256(id.as_str()),
                success: true,
                block_number: Some(1),
            }],
            400..=699 => vec![CallReceipt {
                transaction_hash: keccak256(id.as_str()),
                success: false,
                block_number: Some(1),
            }],
            _ => Vec::new(),
        };
        BatchStatusReport {
            id: id.clone(),
            status_code: code,
            atomic: true,
            receipts,
        }
    }
}

#[async_trait]
impl WalletSession for MockWallet {
    async fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot().await
    }

    async fn connect(&self) -> Result<(), SessionError> {
        self.record(WalletCall::Connect).await;
        self.state.mark_connecting().await;
        self.state
            .mark_connected(vec![self.address], self.home_chain, SessionCapabilities::default())
            .await;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), SessionError> {
        self.record(WalletCall::Disconnect).await;
        self.state.mark_disconnected().await;
        Ok(())
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), SessionError> {
        self.record(WalletCall::SwitchChain(chain_id)).await;
        let behavior = self.behavior().await;
        if let Some(err) = behavior.switch_error {
            return Err(err);
        }
        if !behavior.ignore_switch {
            self.state.set_active_chain(chain_id).await;
        }
        Ok(())
    }

    async fn sign_message(&self, message: &str) -> Result<Signature, SessionError> {
        self.record(WalletCall::SignMessage(message.to_string())).await;
        self.state.require_address().await?;
        if let Some(err) = self.behavior().await.sign_error {
            return Err(err);
        }
        self.sign(&hash_message(message))
    }

    async fn sign_typed_data(
        &self,
        payload: &TypedDataPayload,
    ) -> Result<Signature, SessionError> {
        self.record(WalletCall::SignTypedData(Box::new(payload.clone())))
            .await;
        self.state.require_address().await?;
        if let Some(err) = self.behavior().await.sign_error {
            return Err(err);
        }
        let prehash =
            hash_typed_data(payload).map_err(|e| SessionError::Transport(e.to_string()))?;
        self.sign(&prehash)
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, SessionError> {
        self.record(WalletCall::SendTransaction(tx.clone())).await;
        self.state.require_address().await?;
        let behavior = self.behavior().await;
        if let Some(delay) = behavior.send_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = behavior.send_error {
            return Err(err);
        }
        Ok(self.next_hash("tx"))
    }

    async fn submit_atomic_batch(
        &self,
        calls: &[Call],
        atomic: bool,
    ) -> Result<BatchId, SessionError> {
        self.record(WalletCall::SubmitAtomicBatch {
            calls: calls.to_vec(),
            atomic,
        })
        .await;
        self.state.require_address().await?;
        if let Some(err) = self.behavior().await.batch_error {
            return Err(err);
        }
        Ok(BatchId::new(self.next_hash("batch").to_string()))
    }

    async fn wait_for_batch_status(
        &self,
        id: &BatchId,
    ) -> Result<BatchStatusReport, SessionError> {
        self.record(WalletCall::WaitForBatchStatus(id.clone())).await;
        let code = self.behavior().await.wait_response?;
        Ok(self.report(id, code))
    }

    async fn get_batch_status(&self, id: &BatchId) -> Result<BatchStatusReport, SessionError> {
        self.record(WalletCall::GetBatchStatus(id.clone())).await;
        let code = self.behavior().await.status_response?;
        Ok(self.report(id, code))
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInAssertion, SessionError> {
        self.record(WalletCall::SignIn(request.clone())).await;
        if let Some(err) = self.behavior().await.sign_error {
            return Err(err);
        }
        let message = format!(
            "{} wants you to sign in with your Ethereum account\n\nChain ID: {}\nNonce: {}",
            self.address, request.chain_id, request.nonce
        );
        let signature = self.sign(&hash_message(&message))?;
        self.state
            .mark_connected(
                vec![self.address],
                request.chain_id,
                SessionCapabilities {
                    sign_in: true,
                    ..SessionCapabilities::default()
                },
            )
            .await;
        Ok(SignInAssertion {
            address: self.address,
            message,
            signature,
        })
    }
}

/// Receipt watcher answering from a scripted table
///
/// Hashes without an entry confirm successfully in block 1.
pub struct MockReceiptWatcher {
    responses: Arc<RwLock<HashMap<TxHash, Result<ReceiptStatus, SessionError>>>>,
    delay: Option<Duration>,
    watched: Arc<Mutex<Vec<TxHash>>>,
}

impl MockReceiptWatcher {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            delay: None,
            watched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn set_response(&self, hash: TxHash, response: Result<ReceiptStatus, SessionError>) {
        self.responses.write().await.insert(hash, response);
    }

    pub async fn watched(&self) -> Vec<TxHash> {
        self.watched.lock().await.clone()
    }
}

impl Default for MockReceiptWatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReceiptWatcher for MockReceiptWatcher {
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<Receipt, SessionError> {
        self.watched.lock().await.push(hash);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let status = self
            .responses
            .read()
            .await
            .get(&hash)
            .cloned()
            .unwrap_or(Ok(ReceiptStatus::Success))?;
        Ok(Receipt {
            transaction_hash: hash,
            status,
            block_number: 1,
        })
    }
}
