use alloy_dyn_abi::TypedData;
use alloy_primitives::keccak256;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use thiserror::Error;

use crate::{Address, Signature, TypedDataPayload, B256};

/// Errors that can occur while hashing or recovering a wallet signature
#[derive(Debug, Error, PartialEq)]
pub enum VerificationError {
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid typed data: {0}")]
    InvalidTypedData(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("signer recovery failed")]
    RecoveryFailed,
}

/// Digest signed by `personal_sign`
///
/// `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`
pub fn hash_message(message: impl AsRef<[u8]>) -> B256 {
    let message = message.as_ref();
    let mut prefixed = format!("\x19Ethereum Signed Message:\n{}", message.len()).into_bytes();
    prefixed.extend_from_slice(message);
    keccak256(&prefixed)
}

/// Digest signed by `eth_signTypedData_v4`
pub fn hash_typed_data(payload: &TypedDataPayload) -> Result<B256, VerificationError> {
    let typed: TypedData = serde_json::from_value(payload.to_eip712_json())
        .map_err(|e| VerificationError::InvalidTypedData(e.to_string()))?;

    typed
        .eip712_signing_hash()
        .map_err(|e| VerificationError::InvalidTypedData(e.to_string()))
}

/// Recover the externally-owned account that produced `signature` over `prehash`
///
/// Accepts both `v ∈ {27, 28}` and `v ∈ {0, 1}` and normalizes high-s
/// signatures before recovery.
pub fn recover_address(
    prehash: &B256,
    signature: &Signature,
) -> Result<Address, VerificationError> {
    let bytes = signature.as_bytes();
    if bytes.len() != Signature::LENGTH {
        return Err(VerificationError::InvalidSignature(format!(
            "expected {} bytes, got {}",
            Signature::LENGTH,
            bytes.len()
        )));
    }

    let mut ecdsa = EcdsaSignature::from_slice(&bytes[..64])
        .map_err(|e| VerificationError::InvalidSignature(e.to_string()))?;

    let parity = match bytes[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        other => {
            return Err(VerificationError::InvalidSignature(format!(
                "invalid recovery byte {other}"
            )))
        }
    };
    let mut recovery_id = RecoveryId::from_byte(parity)
        .ok_or_else(|| VerificationError::InvalidSignature("invalid recovery id".to_string()))?;

    if let Some(normalized) = ecdsa.normalize_s() {
        ecdsa = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let key = VerifyingKey::recover_from_prehash(prehash.as_slice(), &ecdsa, recovery_id)
        .map_err(|_| VerificationError::RecoveryFailed)?;

    Ok(address_of(&key))
}

/// Check that `signature` over `prehash` was produced by `address`
///
/// A well-formed signature from a different signer yields `Ok(false)`.
pub fn verify_prehash(
    address: Address,
    prehash: &B256,
    signature: &Signature,
) -> Result<bool, VerificationError> {
    Ok(recover_address(prehash, signature)? == address)
}

/// Sign a 32-byte digest with a raw secp256k1 private key
///
/// Helper for local signers and tests; produces `r || s || v` with `v ∈ {27, 28}`.
pub fn sign_prehash(prehash: &B256, private_key: &[u8]) -> Result<Signature, VerificationError> {
    let key = signing_key(private_key)?;
    let (ecdsa, recovery_id) = key
        .sign_prehash_recoverable(prehash.as_slice())
        .map_err(|e| VerificationError::InvalidPrivateKey(e.to_string()))?;

    let mut bytes = ecdsa.to_bytes().to_vec();
    bytes.push(recovery_id.to_byte() + 27);
    Ok(Signature::new(bytes))
}

/// Address controlled by a raw secp256k1 private key
pub fn address_from_private_key(private_key: &[u8]) -> Result<Address, VerificationError> {
    Ok(address_of(signing_key(private_key)?.verifying_key()))
}

fn signing_key(private_key: &[u8]) -> Result<SigningKey, VerificationError> {
    if private_key.len() != 32 {
        return Err(VerificationError::InvalidPrivateKey(format!(
            "private key must be 32 bytes, got {}",
            private_key.len()
        )));
    }

    SigningKey::from_slice(private_key)
        .map_err(|e| VerificationError::InvalidPrivateKey(e.to_string()))
}

fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
