use std::collections::HashMap;

use alloy_primitives::U256;
use chain_eth::units::{format_fixed, is_hex_string, parse_quantity, Unit};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::context::WalletContext;
use crate::error::WalletError;

/// How one hex quantity is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// `"0x10 (16)"`.
    Count,
    /// `"1.000000 ETH"`.
    Ether,
    /// `"20.00 Gwei"`.
    Gwei,
}

impl FieldFormat {
    fn render(self, hex: &str, value: U256) -> String {
        match self {
            FieldFormat::Count => format!("{hex} ({value})"),
            FieldFormat::Ether => format!("{} ETH", format_fixed(value, Unit::Ether.decimals(), 6)),
            FieldFormat::Gwei => format!("{} Gwei", format_fixed(value, Unit::Gwei.decimals(), 2)),
        }
    }
}

/// Top-level shape of a method's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    Quantity(FieldFormat),
    Block,
    Transaction,
    Receipt,
}

const BLOCK_FIELDS: &[(&str, FieldFormat)] = &[
    ("number", FieldFormat::Count),
    ("gasLimit", FieldFormat::Count),
    ("gasUsed", FieldFormat::Count),
    ("timestamp", FieldFormat::Count),
    ("size", FieldFormat::Count),
    ("difficulty", FieldFormat::Count),
    ("totalDifficulty", FieldFormat::Count),
    ("blobGasUsed", FieldFormat::Count),
    ("excessBlobGas", FieldFormat::Count),
    ("baseFeePerGas", FieldFormat::Gwei),
];

const TRANSACTION_FIELDS: &[(&str, FieldFormat)] = &[
    ("blockNumber", FieldFormat::Count),
    ("nonce", FieldFormat::Count),
    ("gas", FieldFormat::Count),
    ("transactionIndex", FieldFormat::Count),
    ("type", FieldFormat::Count),
    ("chainId", FieldFormat::Count),
    ("value", FieldFormat::Ether),
    ("gasPrice", FieldFormat::Gwei),
    ("maxFeePerGas", FieldFormat::Gwei),
    ("maxPriorityFeePerGas", FieldFormat::Gwei),
];

const RECEIPT_FIELDS: &[(&str, FieldFormat)] = &[
    ("blockNumber", FieldFormat::Count),
    ("transactionIndex", FieldFormat::Count),
    ("gasUsed", FieldFormat::Count),
    ("cumulativeGasUsed", FieldFormat::Count),
    ("status", FieldFormat::Count),
    ("type", FieldFormat::Count),
    ("effectiveGasPrice", FieldFormat::Gwei),
];

/// Method name → result shape, built once.
#[derive(Debug, Clone)]
pub struct DecoderTable {
    shapes: HashMap<&'static str, ResultShape>,
}

impl Default for DecoderTable {
    fn default() -> Self {
        use FieldFormat::*;
        use ResultShape::*;

        let entries: &[(&'static str, ResultShape)] = &[
            ("eth_blockNumber", Quantity(Count)),
            ("eth_chainId", Quantity(Count)),
            ("eth_getTransactionCount", Quantity(Count)),
            ("eth_estimateGas", Quantity(Count)),
            ("eth_getBlockTransactionCountByNumber", Quantity(Count)),
            ("eth_getBlockTransactionCountByHash", Quantity(Count)),
            ("eth_getUncleCountByBlockNumber", Quantity(Count)),
            ("eth_getUncleCountByBlockHash", Quantity(Count)),
            ("net_peerCount", Quantity(Count)),
            ("eth_getBalance", Quantity(Ether)),
            ("eth_gasPrice", Quantity(Gwei)),
            ("eth_maxPriorityFeePerGas", Quantity(Gwei)),
            ("eth_blobBaseFee", Quantity(Gwei)),
            ("eth_getBlockByNumber", Block),
            ("eth_getBlockByHash", Block),
            ("eth_getTransactionByHash", Transaction),
            ("eth_getTransactionByBlockNumberAndIndex", Transaction),
            ("eth_getTransactionByBlockHashAndIndex", Transaction),
            ("eth_getTransactionReceipt", Receipt),
        ];
        Self {
            shapes: entries.iter().copied().collect(),
        }
    }
}

impl DecoderTable {
    pub fn shape(&self, method: &str) -> Option<ResultShape> {
        self.shapes.get(method).copied()
    }

    /// Decodes `result` as the output of `method`. Only the known top-level
    /// shape is decoded; anything else passes through unchanged.
    pub fn decode(&self, method: &str, result: &Value) -> Value {
        match self.shape(method) {
            Some(ResultShape::Quantity(format)) => decode_quantity(result, format),
            Some(ResultShape::Block) => decode_block(result),
            Some(ResultShape::Transaction) => decode_object(result, TRANSACTION_FIELDS),
            Some(ResultShape::Receipt) => decode_object(result, RECEIPT_FIELDS),
            None => decode_unknown(result),
        }
    }
}

fn hex_quantity(value: &Value) -> Option<(&str, U256)> {
    let text = value.as_str().filter(|s| is_hex_string(s))?;
    // Longer than 256 bits: not a quantity, leave it alone.
    let parsed = parse_quantity(text).ok()?;
    Some((text, parsed))
}

fn decode_quantity(value: &Value, format: FieldFormat) -> Value {
    match hex_quantity(value) {
        Some((hex, parsed)) => Value::String(format.render(hex, parsed)),
        None => value.clone(),
    }
}

fn decode_object(value: &Value, fields: &[(&str, FieldFormat)]) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };
    let mut out = Map::with_capacity(map.len());
    for (key, field) in map {
        let decoded = fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, format)| decode_quantity(field, *format))
            .unwrap_or_else(|| field.clone());
        out.insert(key.clone(), decoded);
    }
    Value::Object(out)
}

fn decode_block(value: &Value) -> Value {
    let mut block = decode_object(value, BLOCK_FIELDS);
    // Full blocks embed transaction objects; hash-only blocks are left as is.
    if let Some(Value::Array(txs)) = block.get_mut("transactions") {
        for tx in txs.iter_mut().filter(|tx| tx.is_object()) {
            *tx = decode_object(tx, TRANSACTION_FIELDS);
        }
    }
    block
}

fn decode_unknown(value: &Value) -> Value {
    match hex_quantity(value) {
        Some((hex, parsed)) => Value::String(format!("{hex} {parsed}")),
        None => value.clone(),
    }
}

/// One executed raw request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcCallRecord {
    pub method: String,
    pub params: Value,
    pub raw_result: Value,
    pub decoded: Value,
}

/// Sends arbitrary JSON-RPC requests and decodes well-known results.
#[derive(Debug, Clone, Default)]
pub struct RawRpcExecutor {
    table: DecoderTable,
}

impl RawRpcExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `method` with `params` (a JSON array, or empty/null for none).
    /// Sent once; the method may have side effects.
    pub async fn execute(
        &self,
        ctx: &WalletContext,
        method: &str,
        params: Value,
    ) -> Result<RpcCallRecord, WalletError> {
        let method = method.trim();
        if method.is_empty() {
            return Err(WalletError::validation("method name is required"));
        }
        let params = normalize_params(params)?;

        debug!(method, "raw rpc request");
        let raw_result = ctx.rpc().send(method, params.clone()).await?;
        let decoded = self.table.decode(method, &raw_result);
        Ok(RpcCallRecord {
            method: method.to_string(),
            params,
            raw_result,
            decoded,
        })
    }

    /// Like [`execute`](Self::execute) with params typed as JSON text.
    pub async fn execute_str(
        &self,
        ctx: &WalletContext,
        method: &str,
        params_json: &str,
    ) -> Result<RpcCallRecord, WalletError> {
        let params = if params_json.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(params_json)
                .map_err(|e| WalletError::validation(format!("params are not valid JSON: {e}")))?
        };
        self.execute(ctx, method, params).await
    }
}

fn normalize_params(params: Value) -> Result<Value, WalletError> {
    match params {
        Value::Null => Ok(Value::Array(Vec::new())),
        Value::Array(_) => Ok(params),
        other => Err(WalletError::validation(format!(
            "params must be a JSON array, got {other}"
        ))),
    }
}
