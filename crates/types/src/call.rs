use serde::{Deserialize, Serialize};

use crate::{Address, Bytes, U256};

/// A single contract call inside an atomic batch or router multicall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Target contract or account
    pub to: Address,

    /// Calldata (may be empty for plain value transfers)
    #[serde(default)]
    pub data: Bytes,

    /// Native asset value attached to the call (wei)
    #[serde(default)]
    pub value: U256,
}

impl Call {
    pub fn new(to: Address) -> Self {
        Self {
            to,
            data: Bytes::new(),
            value: U256::ZERO,
        }
    }

    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Request for a single wallet-submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub to: Address,

    #[serde(default)]
    pub data: Option<Bytes>,

    #[serde(default)]
    pub value: U256,
}

impl TransactionRequest {
    pub fn new(to: Address) -> Self {
        Self {
            to,
            data: None,
            value: U256::ZERO,
        }
    }

    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

impl From<Call> for TransactionRequest {
    fn from(call: Call) -> Self {
        Self {
            to: call.to,
            data: (!call.data.is_empty()).then_some(call.data),
            value: call.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_builder() {
        let call = Call::new(Address::ZERO)
            .with_data(vec![0x12, 0x34])
            .with_value(U256::from(7));

        assert_eq!(&call.data[..], &[0x12u8, 0x34]);
        assert_eq!(call.value, U256::from(7));
    }

    #[test]
    fn test_empty_call_converts_to_transfer() {
        let tx: TransactionRequest = Call::new(Address::ZERO).into();
        assert!(tx.data.is_none());
        assert_eq!(tx.value, U256::ZERO);
    }
}
