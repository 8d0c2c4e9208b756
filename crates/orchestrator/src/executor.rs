use std::sync::Arc;
use tracing::{debug, info, warn};
use wallet_actions_metrics::MetricsCollector;
use wallet_actions_session::{SignatureVerifier, WalletSession};
use wallet_actions_types::{
    ActionResult, Address, SignInRequest, Signature, SignatureKind, TransactionRef,
    TransactionRequest, TypedDataPayload,
};

use crate::OperationError;

/// A single wallet request
#[derive(Debug, Clone, PartialEq)]
pub enum OperationRequest {
    SignMessage { message: String },
    SignTypedData { payload: Box<TypedDataPayload> },
    SendTransaction { tx: TransactionRequest },
    SignIn { request: SignInRequest },
}

impl OperationRequest {
    fn name(&self) -> &'static str {
        match self {
            OperationRequest::SignMessage { .. } => "sign_message",
            OperationRequest::SignTypedData { .. } => "sign_typed_data",
            OperationRequest::SendTransaction { .. } => "send_transaction",
            OperationRequest::SignIn { .. } => "sign_in",
        }
    }
}

/// Runs one wallet request and shapes the answer into an [`ActionResult`]
///
/// Signatures are verified against the session's primary address when one
/// is known; a mismatch is reported in the result, not as a failure.
pub struct OperationExecutor {
    session: Arc<dyn WalletSession>,
    verifier: Arc<dyn SignatureVerifier>,
    metrics: MetricsCollector,
}

impl OperationExecutor {
    pub fn new(session: Arc<dyn WalletSession>, verifier: Arc<dyn SignatureVerifier>) -> Self {
        Self {
            session,
            verifier,
            metrics: MetricsCollector::new(),
        }
    }

    pub async fn execute(&self, request: OperationRequest) -> Result<ActionResult, OperationError> {
        debug!(operation = request.name(), "Executing wallet operation");

        match request {
            OperationRequest::SignMessage { message } => self.sign_message(&message).await,
            OperationRequest::SignTypedData { payload } => self.sign_typed_data(*payload).await,
            OperationRequest::SendTransaction { tx } => self.send_transaction(&tx).await,
            OperationRequest::SignIn { request } => self.sign_in(&request).await,
        }
    }

    async fn sign_message(&self, message: &str) -> Result<ActionResult, OperationError> {
        let signature = self.session.sign_message(message).await?;

        let verified = match self.verifying_address().await {
            Some(address) => Some(self.check(
                address,
                self.verifier.verify_message(address, message, &signature).await,
            )),
            None => None,
        };
        self.metrics.record_signature_verification(verified);

        Ok(ActionResult::Signature {
            kind: SignatureKind::Message,
            value: signature,
            verified,
        })
    }

    async fn sign_typed_data(
        &self,
        payload: TypedDataPayload,
    ) -> Result<ActionResult, OperationError> {
        let active_chain = self.session.snapshot().await.active_chain_id;
        let payload = if active_chain != 0 {
            payload.bind_chain(active_chain)
        } else {
            payload
        };

        let signature = self.session.sign_typed_data(&payload).await?;

        let verified = match self.verifying_address().await {
            Some(address) => Some(self.check(
                address,
                self.verifier
                    .verify_typed_data(address, &payload, &signature)
                    .await,
            )),
            None => None,
        };
        self.metrics.record_signature_verification(verified);

        Ok(ActionResult::Signature {
            kind: SignatureKind::TypedData,
            value: signature,
            verified,
        })
    }

    async fn send_transaction(
        &self,
        tx: &TransactionRequest,
    ) -> Result<ActionResult, OperationError> {
        let snapshot = self.session.snapshot().await;
        let from = snapshot
            .primary_address()
            .filter(|_| snapshot.is_connected())
            .ok_or(OperationError::SessionUnavailable)?;

        let hash = self.session.send_transaction(tx).await?;
        info!(%from, to = %tx.to, tx_hash = %hash, "Transaction submitted");

        Ok(ActionResult::Transaction(TransactionRef::new(hash)))
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<ActionResult, OperationError> {
        if request.chain_id == 0 {
            return Err(OperationError::InvalidRequest(
                "sign-in requires a chain id".to_string(),
            ));
        }

        let assertion = self.session.sign_in(request).await?;
        info!(address = %assertion.address, chain_id = request.chain_id, "Signed in");

        Ok(ActionResult::SignIn(assertion))
    }

    async fn verifying_address(&self) -> Option<Address> {
        let snapshot = self.session.snapshot().await;
        if !snapshot.is_connected() {
            return None;
        }
        snapshot.primary_address()
    }

    fn check(
        &self,
        address: Address,
        result: Result<bool, wallet_actions_types::VerificationError>,
    ) -> bool {
        match result {
            Ok(true) => true,
            Ok(false) => {
                warn!(%address, "Signature does not match connected address");
                false
            }
            Err(e) => {
                warn!(%address, error = %e, "Signature verification failed");
                false
            }
        }
    }
}

/// Extract the signature from a signing result
pub fn signature_of(result: &ActionResult) -> Option<&Signature> {
    match result {
        ActionResult::Signature { value, .. } => Some(value),
        ActionResult::SignIn(assertion) => Some(&assertion.signature),
        _ => None,
    }
}
