use serde::{Deserialize, Serialize};
use std::fmt;

pub use alloy_primitives::{Address, Bytes, B256, U256};

/// Numeric identifier of an EVM network
pub type ChainId = u64;

/// Ethereum mainnet
pub const MAINNET_CHAIN_ID: ChainId = 1;

/// Base mainnet
pub const BASE_CHAIN_ID: ChainId = 8453;

/// Hash of a submitted transaction
pub type TxHash = B256;

/// Identifier returned by a wallet for an atomic call batch
///
/// Wallets choose the format; it is treated as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 65-byte recoverable ECDSA signature (`r || s || v`) as produced by a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(Bytes);

impl Signature {
    pub const LENGTH: usize = 65;

    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a `0x`-prefixed hex signature
    pub fn from_hex(value: &str) -> Result<Self, hex::FromHexError> {
        let raw = value.strip_prefix("0x").unwrap_or(value);
        Ok(Self(Bytes::from(hex::decode(raw)?)))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
