use alloy_primitives::{Address, Bytes, U256};
use chain_eth::address::to_checksum;
use chain_eth::chains::network_display_name;
use chain_eth::units::{parse_quantity, to_quantity};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::RpcError;

/// Chain identity of an endpoint, derived best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    pub chain_id: u64,
    pub name: String,
}

impl NetworkDescriptor {
    /// Sentinel used when detection fails.
    pub fn unknown() -> Self {
        Self {
            chain_id: 0,
            name: "unknown".to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.chain_id == 0
    }

    /// Friendly label for well-known chains, `Chain <id>` otherwise.
    pub fn display_name(&self) -> String {
        network_display_name(self.chain_id)
    }
}

/// Current fee suggestion. `max_fee_per_gas` and `max_priority_fee_per_gas`
/// are only present on chains that report a base fee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeQuote {
    pub gas_price: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
}

impl FeeQuote {
    /// `(max_fee, max_priority_fee)` when both EIP-1559 fields are present.
    pub fn eip1559(&self) -> Option<(U256, U256)> {
        self.max_fee_per_gas.zip(self.max_priority_fee_per_gas)
    }
}

/// Parameters of `eth_call` / `eth_estimateGas`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub value: Option<U256>,
    pub data: Option<Bytes>,
    pub gas: Option<u64>,
    pub gas_price: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
}

impl CallRequest {
    /// JSON-RPC transaction object; absent fields are omitted.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        if let Some(from) = &self.from {
            obj.insert("from".into(), Value::String(to_checksum(from)));
        }
        if let Some(to) = &self.to {
            obj.insert("to".into(), Value::String(to_checksum(to)));
        }
        if let Some(value) = self.value {
            obj.insert("value".into(), Value::String(to_quantity(value)));
        }
        if let Some(data) = &self.data {
            obj.insert("data".into(), Value::String(format!("0x{}", hex::encode(data))));
        }
        if let Some(gas) = self.gas {
            obj.insert("gas".into(), Value::String(to_quantity(U256::from(gas))));
        }
        if let Some(gas_price) = self.gas_price {
            obj.insert("gasPrice".into(), Value::String(to_quantity(gas_price)));
        }
        if let Some(max_fee) = self.max_fee_per_gas {
            obj.insert("maxFeePerGas".into(), Value::String(to_quantity(max_fee)));
        }
        if let Some(priority) = self.max_priority_fee_per_gas {
            obj.insert(
                "maxPriorityFeePerGas".into(),
                Value::String(to_quantity(priority)),
            );
        }
        Value::Object(obj)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// Post-confirmation record of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: u64,
    pub block_hash: Option<String>,
    pub gas_used: U256,
    pub effective_gas_price: Option<U256>,
    pub status: ReceiptStatus,
    pub from: Option<String>,
    pub to: Option<String>,
    pub contract_address: Option<String>,
}

impl TransactionReceipt {
    /// Parses an `eth_getTransactionReceipt` result object.
    ///
    /// Receipts from before Byzantium carry no `status`; those count as success.
    pub fn from_json(value: &Value) -> Result<Self, RpcError> {
        let status = match optional_str(value, "status")
            .map(parse_quantity)
            .transpose()?
        {
            Some(code) if code.is_zero() => ReceiptStatus::Reverted,
            _ => ReceiptStatus::Success,
        };

        Ok(Self {
            transaction_hash: required_str(value, "transactionHash")?.to_string(),
            block_number: quantity_u64(required_str(value, "blockNumber")?)?,
            block_hash: optional_str(value, "blockHash").map(str::to_string),
            gas_used: parse_quantity(required_str(value, "gasUsed")?)?,
            effective_gas_price: optional_str(value, "effectiveGasPrice")
                .map(parse_quantity)
                .transpose()?,
            status,
            from: optional_str(value, "from").map(str::to_string),
            to: optional_str(value, "to").map(str::to_string),
            contract_address: optional_str(value, "contractAddress").map(str::to_string),
        })
    }

    pub fn succeeded(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}

fn optional_str<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value.get(field).and_then(Value::as_str)
}

fn required_str<'a>(value: &'a Value, field: &str) -> Result<&'a str, RpcError> {
    optional_str(value, field)
        .ok_or_else(|| RpcError::InvalidResponse(format!("missing field {field}")))
}

/// Parses a hex quantity that must fit in 64 bits.
pub fn quantity_u64(quantity: &str) -> Result<u64, RpcError> {
    let value = parse_quantity(quantity)?;
    u64::try_from(value)
        .map_err(|_| RpcError::InvalidResponse(format!("quantity {quantity} exceeds 64 bits")))
}

/// Extracts and parses a hex-quantity result.
pub fn expect_quantity(method: &str, value: &Value) -> Result<U256, RpcError> {
    let text = value
        .as_str()
        .ok_or_else(|| RpcError::InvalidResponse(format!("{method}: expected hex string, got {value}")))?;
    Ok(parse_quantity(text)?)
}

/// Extracts a hex data result into bytes.
pub fn expect_bytes(method: &str, value: &Value) -> Result<Bytes, RpcError> {
    let text = value
        .as_str()
        .ok_or_else(|| RpcError::InvalidResponse(format!("{method}: expected hex string, got {value}")))?;
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| RpcError::InvalidResponse(format!("{method}: missing 0x prefix")))?;
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| RpcError::InvalidResponse(format!("{method}: invalid hex: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_eth::address::parse_address;
    use serde_json::json;

    #[test]
    fn unknown_network_sentinel() {
        let net = NetworkDescriptor::unknown();
        assert_eq!(net.chain_id, 0);
        assert_eq!(net.name, "unknown");
        assert!(net.is_unknown());
    }

    #[test]
    fn display_name_uses_table() {
        let net = NetworkDescriptor {
            chain_id: 11155111,
            name: "sepolia".into(),
        };
        assert_eq!(net.display_name(), "Sepolia Testnet");
    }

    #[test]
    fn fee_quote_needs_both_eip1559_fields() {
        let partial = FeeQuote {
            gas_price: Some(U256::from(1u64)),
            max_fee_per_gas: Some(U256::from(2u64)),
            max_priority_fee_per_gas: None,
        };
        assert_eq!(partial.eip1559(), None);

        let full = FeeQuote {
            max_priority_fee_per_gas: Some(U256::from(3u64)),
            ..partial
        };
        assert_eq!(full.eip1559(), Some((U256::from(2u64), U256::from(3u64))));
    }

    #[test]
    fn call_request_json_omits_absent_fields() {
        let req = CallRequest {
            to: Some(parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap()),
            value: Some(U256::from(1_000_000_000_000_000_000u128)),
            data: Some(Bytes::from(vec![0x70, 0xa0, 0x82, 0x31])),
            ..Default::default()
        };
        assert_eq!(
            req.to_json(),
            json!({
                "to": "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
                "value": "0xde0b6b3a7640000",
                "data": "0x70a08231"
            })
        );
    }

    #[test]
    fn receipt_parses_success_and_revert() {
        let mut raw = json!({
            "transactionHash": "0xabc",
            "blockNumber": "0x10",
            "blockHash": "0xdef",
            "gasUsed": "0x5208",
            "status": "0x1",
            "from": "0x1111111111111111111111111111111111111111",
            "to": "0x2222222222222222222222222222222222222222",
            "contractAddress": null
        });
        let receipt = TransactionReceipt::from_json(&raw).unwrap();
        assert_eq!(receipt.block_number, 16);
        assert_eq!(receipt.gas_used, U256::from(21_000u64));
        assert!(receipt.succeeded());
        assert_eq!(receipt.contract_address, None);

        raw["status"] = json!("0x0");
        let reverted = TransactionReceipt::from_json(&raw).unwrap();
        assert_eq!(reverted.status, ReceiptStatus::Reverted);
    }

    #[test]
    fn receipt_without_status_counts_as_success() {
        let raw = json!({ "transactionHash": "0xabc", "blockNumber": "0x1", "gasUsed": "0x0" });
        assert!(TransactionReceipt::from_json(&raw).unwrap().succeeded());
    }

    #[test]
    fn receipt_missing_fields_errors() {
        let raw = json!({ "transactionHash": "0xabc" });
        assert!(matches!(
            TransactionReceipt::from_json(&raw),
            Err(RpcError::InvalidResponse(_))
        ));
    }

    #[test]
    fn quantity_helpers_validate_shape() {
        assert_eq!(quantity_u64("0x5208").unwrap(), 21_000);
        assert!(quantity_u64("0x10000000000000000").is_err());
        assert!(expect_quantity("eth_gasPrice", &json!(5)).is_err());
        assert_eq!(
            expect_bytes("eth_call", &json!("0x0102")).unwrap().as_ref(),
            &[1u8, 2]
        );
        assert_eq!(expect_bytes("eth_getCode", &json!("0x")).unwrap().len(), 0);
    }
}
