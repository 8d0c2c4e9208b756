use async_trait::async_trait;
use wallet_actions_types::{
    Address, BatchId, BatchStatusReport, Call, ChainId, Receipt, SessionSnapshot,
    SignInAssertion, SignInRequest, Signature, TransactionRequest, TxHash, TypedDataPayload,
    VerificationError,
};

use crate::SessionError;

/// Capability set of a connected wallet
///
/// Implemented by the wallet transport. Every request method suspends until
/// the wallet answers; timeouts are the transport's concern.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Current connection status, accounts and active chain
    async fn snapshot(&self) -> SessionSnapshot;

    async fn connect(&self) -> Result<(), SessionError>;

    async fn disconnect(&self) -> Result<(), SessionError>;

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), SessionError>;

    async fn sign_message(&self, message: &str) -> Result<Signature, SessionError>;

    async fn sign_typed_data(&self, payload: &TypedDataPayload)
        -> Result<Signature, SessionError>;

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, SessionError>;

    /// Submit calls as one unit; with `atomic` set, all calls land or none do
    async fn submit_atomic_batch(
        &self,
        calls: &[Call],
        atomic: bool,
    ) -> Result<BatchId, SessionError>;

    /// Block until the batch reaches a final status
    async fn wait_for_batch_status(&self, id: &BatchId)
        -> Result<BatchStatusReport, SessionError>;

    /// Point-in-time status of a batch
    async fn get_batch_status(&self, id: &BatchId) -> Result<BatchStatusReport, SessionError>;

    /// `connect` extended with sign-in, returning the signed session assertion
    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInAssertion, SessionError>;
}

/// Validates wallet signatures against the signed payload
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    async fn verify_message(
        &self,
        address: Address,
        message: &str,
        signature: &Signature,
    ) -> Result<bool, VerificationError>;

    async fn verify_typed_data(
        &self,
        address: Address,
        payload: &TypedDataPayload,
        signature: &Signature,
    ) -> Result<bool, VerificationError>;
}

/// Observes on-chain confirmation of a submitted transaction
///
/// Polling or streaming strategy belongs to the implementation.
#[async_trait]
pub trait ReceiptWatcher: Send + Sync {
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<Receipt, SessionError>;
}
