//! Stateless helpers for the dashboard's utility panels, and lookups of
//! transactions, receipts and blocks by hash or number.

use chain_eth::address;
use chain_eth::units::{self, Unit, UnitConversion};
use eth_rpc::TransactionReceipt;
use serde_json::Value;

use crate::context::WalletContext;
use crate::error::WalletError;

/// Converts an amount typed in `from` into wei, gwei and ether.
pub fn convert_units(amount: &str, from: Unit) -> Result<UnitConversion, WalletError> {
    Ok(units::convert_units(amount, from)?)
}

/// Parses a unit name as typed in the converter (`wei`, `gwei`, `ether`).
pub fn parse_unit(name: &str) -> Result<Unit, WalletError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "wei" => Ok(Unit::Wei),
        "gwei" => Ok(Unit::Gwei),
        "ether" | "eth" => Ok(Unit::Ether),
        other => Err(WalletError::validation(format!("unknown unit: {other}"))),
    }
}

/// `true` only for a well-formed address whose checksum, if mixed-case, holds.
pub fn validate_address(input: &str) -> bool {
    matches!(address::validate_address(input.trim()), Ok(true))
}

pub fn to_checksum_address(input: &str) -> Result<String, WalletError> {
    Ok(address::checksum_address(input.trim())?)
}

/// `0x` followed by exactly 64 hex digits.
pub fn validate_tx_hash(hash: &str) -> Result<String, WalletError> {
    let hash = hash.trim();
    let ok = hash
        .strip_prefix("0x")
        .is_some_and(|digits| digits.len() == 64 && digits.chars().all(|c| c.is_ascii_hexdigit()));
    if !ok {
        return Err(WalletError::validation(format!("invalid transaction hash: {hash}")));
    }
    Ok(hash.to_string())
}

pub async fn get_transaction(ctx: &WalletContext, hash: &str) -> Result<Option<Value>, WalletError> {
    let hash = validate_tx_hash(hash)?;
    Ok(ctx.rpc().get_transaction_by_hash(&hash).await?)
}

pub async fn get_transaction_receipt(
    ctx: &WalletContext,
    hash: &str,
) -> Result<Option<TransactionReceipt>, WalletError> {
    let hash = validate_tx_hash(hash)?;
    Ok(ctx.rpc().get_transaction_receipt(&hash).await?)
}

/// Fetches a block header with transaction hashes; `None` means `latest`.
pub async fn get_block(ctx: &WalletContext, number: Option<u64>) -> Result<Option<Value>, WalletError> {
    let tag = match number {
        Some(n) => units::to_quantity(alloy_primitives::U256::from(n)),
        None => "latest".to_string(),
    };
    Ok(ctx.rpc().get_block_by_number(&tag, false).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use eth_rpc::config::ClientSettings;
    use eth_rpc::scripted::ScriptedTransport;
    use eth_rpc::{EndpointConfig, RpcSession};
    use serde_json::json;
    use std::sync::Arc;

    const HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";

    fn ctx(transport: &Arc<ScriptedTransport>) -> WalletContext {
        let rpc = RpcSession::new(
            EndpointConfig::new("https://rpc.example").unwrap(),
            transport.clone(),
            ClientSettings::default(),
        );
        WalletContext::new(Arc::new(rpc), None)
    }

    #[test]
    fn converts_from_gwei() {
        let out = convert_units("1.5", parse_unit("Gwei").unwrap()).unwrap();
        assert_eq!(out.wei, "1500000000");
        assert_eq!(out.ether, "0.0000000015");
    }

    #[test]
    fn unknown_unit_rejected() {
        assert_eq!(parse_unit("finney").unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn address_validation() {
        assert!(validate_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert!(validate_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(!validate_address("0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert!(!validate_address("0x1234"));
        assert!(!validate_address(""));
    }

    #[test]
    fn checksum_conversion() {
        assert_eq!(
            to_checksum_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
        assert_eq!(to_checksum_address("nope").unwrap_err().kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn malformed_hash_makes_no_call() {
        let transport = Arc::new(ScriptedTransport::new());
        let err = get_transaction(&ctx(&transport), "0x1234").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_transaction_is_none() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("eth_getTransactionByHash", Value::Null);
        assert!(get_transaction(&ctx(&transport), HASH).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn receipt_lookup_parses() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            "eth_getTransactionReceipt",
            json!({ "transactionHash": HASH, "blockNumber": "0x10", "gasUsed": "0x5208", "status": "0x1" }),
        );
        let receipt = get_transaction_receipt(&ctx(&transport), HASH).await.unwrap().unwrap();
        assert_eq!(receipt.block_number, 16);
    }

    #[tokio::test]
    async fn block_tag_is_quantity_or_latest() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("eth_getBlockByNumber", json!({ "number": "0x10" }));
        let ctx = ctx(&transport);

        get_block(&ctx, Some(16)).await.unwrap();
        get_block(&ctx, None).await.unwrap();

        let params: Vec<Value> = transport.calls().into_iter().map(|c| c.params).collect();
        assert_eq!(params, vec![json!(["0x10", false]), json!(["latest", false])]);
    }
}
