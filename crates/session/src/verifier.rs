use async_trait::async_trait;
use wallet_actions_types::{
    hash_message, hash_typed_data, verify_prehash, Address, Signature, TypedDataPayload,
    VerificationError,
};

use crate::SignatureVerifier;

/// Verifier for externally-owned accounts using ECDSA signer recovery
///
/// Contract accounts (ERC-1271) need an RPC-backed verifier instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaVerifier;

#[async_trait]
impl SignatureVerifier for EcdsaVerifier {
    async fn verify_message(
        &self,
        address: Address,
        message: &str,
        signature: &Signature,
    ) -> Result<bool, VerificationError> {
        verify_prehash(address, &hash_message(message), signature)
    }

    async fn verify_typed_data(
        &self,
        address: Address,
        payload: &TypedDataPayload,
        signature: &Signature,
    ) -> Result<bool, VerificationError> {
        verify_prehash(address, &hash_typed_data(payload)?, signature)
    }
}
