use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Address, ChainId, Signature};

/// EIP-712 domain separator fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Left unset to bind the payload to the session's active chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<Address>,
}

/// One member of an EIP-712 struct type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TypedField {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// Structured, domain-scoped payload for typed data signing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataPayload {
    pub domain: TypedDataDomain,
    pub types: BTreeMap<String, Vec<TypedField>>,
    pub primary_type: String,
    pub message: serde_json::Value,
}

impl TypedDataPayload {
    /// Fill in the domain chain id when the caller left it unset
    pub fn bind_chain(mut self, chain_id: ChainId) -> Self {
        if self.domain.chain_id.is_none() {
            self.domain.chain_id = Some(chain_id);
        }
        self
    }

    /// Field list for the implicit `EIP712Domain` type, derived from which
    /// domain fields are present
    pub fn domain_fields(&self) -> Vec<TypedField> {
        let mut fields = Vec::new();
        if self.domain.name.is_some() {
            fields.push(TypedField::new("name", "string"));
        }
        if self.domain.version.is_some() {
            fields.push(TypedField::new("version", "string"));
        }
        if self.domain.chain_id.is_some() {
            fields.push(TypedField::new("chainId", "uint256"));
        }
        if self.domain.verifying_contract.is_some() {
            fields.push(TypedField::new("verifyingContract", "address"));
        }
        fields
    }

    /// Render as the standard `eth_signTypedData_v4` JSON document
    pub fn to_eip712_json(&self) -> serde_json::Value {
        let mut types = serde_json::Map::new();
        types.insert(
            "EIP712Domain".to_string(),
            serde_json::to_value(self.domain_fields()).unwrap_or_default(),
        );
        for (name, fields) in &self.types {
            types.insert(
                name.clone(),
                serde_json::to_value(fields).unwrap_or_default(),
            );
        }

        let mut domain = serde_json::Map::new();
        if let Some(name) = &self.domain.name {
            domain.insert("name".to_string(), name.clone().into());
        }
        if let Some(version) = &self.domain.version {
            domain.insert("version".to_string(), version.clone().into());
        }
        if let Some(chain_id) = self.domain.chain_id {
            domain.insert("chainId".to_string(), format!("{chain_id:#x}").into());
        }
        if let Some(contract) = &self.domain.verifying_contract {
            domain.insert("verifyingContract".to_string(), contract.to_string().into());
        }

        serde_json::json!({
            "types": types,
            "primaryType": self.primary_type,
            "domain": domain,
            "message": self.message,
        })
    }
}

/// Parameters for the sign-in extension of wallet `connect`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub chain_id: ChainId,
    pub nonce: String,
}

impl SignInRequest {
    pub fn new(chain_id: ChainId, nonce: impl Into<String>) -> Self {
        Self {
            chain_id,
            nonce: nonce.into(),
        }
    }
}

/// Session assertion returned by a sign-in capable wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInAssertion {
    pub address: Address,
    /// The sign-in message the wallet presented to the user
    pub message: String,
    pub signature: Signature,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> TypedDataPayload {
        let mut types = BTreeMap::new();
        types.insert(
            "Message".to_string(),
            vec![TypedField::new("contents", "string")],
        );

        TypedDataPayload {
            domain: TypedDataDomain {
                name: Some("Wallet Playground".to_string()),
                version: Some("1".to_string()),
                chain_id: None,
                verifying_contract: Some(Address::ZERO),
            },
            types,
            primary_type: "Message".to_string(),
            message: serde_json::json!({ "contents": "Hello, world!" }),
        }
    }

    #[test]
    fn test_bind_chain_fills_missing_chain_id() {
        let bound = payload().bind_chain(8453);
        assert_eq!(bound.domain.chain_id, Some(8453));
    }

    #[test]
    fn test_bind_chain_keeps_explicit_chain_id() {
        let mut explicit = payload();
        explicit.domain.chain_id = Some(1);
        assert_eq!(explicit.bind_chain(8453).domain.chain_id, Some(1));
    }

    #[test]
    fn test_eip712_json_shape() {
        let json = payload().bind_chain(8453).to_eip712_json();

        assert_eq!(json["primaryType"], "Message");
        assert_eq!(json["domain"]["chainId"], "0x2105");
        assert_eq!(json["types"]["EIP712Domain"].as_array().unwrap().len(), 4);
        assert_eq!(json["types"]["Message"][0]["type"], "string");
    }
}
