//! Dynamic binding to a deployed contract from its JSON ABI.
//!
//! Every function fragment is resolved once at load time into a
//! [`MethodDescriptor`] carrying its selector, parsed types and the coercion
//! rule for each input. Invocation is then a table lookup, never a string
//! match on type names.

use alloy_primitives::Address;
use chain_eth::abi::{self, AbiType, Param, StateMutability};
use chain_eth::address::{parse_address, to_checksum, ZERO_ADDRESS};
use eth_rpc::CallRequest;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::builder::TransactionBuilder;
use crate::context::WalletContext;
use crate::error::WalletError;
use crate::intent::TransactionIntent;
use crate::signer::ReceiptSummary;

/// How a raw UI string becomes an ABI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Empty → `"0"`.
    Integer,
    /// Empty → `false`.
    Bool,
    /// Empty → the zero address.
    Address,
    /// Parsed as JSON; kept as the raw string if that fails.
    Composite,
    Passthrough,
}

impl Coercion {
    fn for_type(ty: &AbiType) -> Self {
        match ty {
            t if t.is_integer() => Coercion::Integer,
            t if t.is_composite() => Coercion::Composite,
            AbiType::Bool => Coercion::Bool,
            AbiType::Address => Coercion::Address,
            _ => Coercion::Passthrough,
        }
    }

    pub fn apply(self, raw: &str) -> Value {
        match self {
            Coercion::Integer if raw.is_empty() => Value::String("0".into()),
            Coercion::Bool if raw.is_empty() => Value::Bool(false),
            Coercion::Address if raw.is_empty() => Value::String(ZERO_ADDRESS.into()),
            Coercion::Composite => {
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
            }
            _ => Value::String(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodParam {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&Param> for MethodParam {
    fn from(param: &Param) -> Self {
        Self {
            name: param.name.clone(),
            kind: param.kind.clone(),
        }
    }
}

/// One callable function of a contract, fully resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptor {
    pub name: String,
    /// Canonical `name(type,...)`.
    pub signature: String,
    pub inputs: Vec<MethodParam>,
    pub outputs: Vec<MethodParam>,
    pub mutability: StateMutability,
    #[serde(skip)]
    selector: [u8; 4],
    #[serde(skip)]
    input_types: Vec<AbiType>,
    #[serde(skip)]
    output_types: Vec<AbiType>,
    #[serde(skip)]
    coercions: Vec<Coercion>,
}

impl MethodDescriptor {
    fn resolve(fragment: &abi::Fragment) -> Result<Self, WalletError> {
        let input_types = fragment.input_types()?;
        let output_types = fragment.output_types()?;
        let signature = abi::function_signature(&fragment.name, &input_types);
        Ok(Self {
            name: fragment.name.clone(),
            selector: abi::selector(&signature),
            signature,
            inputs: fragment.inputs.iter().map(MethodParam::from).collect(),
            outputs: fragment.outputs.iter().map(MethodParam::from).collect(),
            mutability: fragment.mutability(),
            coercions: input_types.iter().map(Coercion::for_type).collect(),
            input_types,
            output_types,
        })
    }

    pub fn is_read(&self) -> bool {
        self.mutability.is_read()
    }

    pub fn selector(&self) -> [u8; 4] {
        self.selector
    }

    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }

    pub fn coercions(&self) -> &[Coercion] {
        &self.coercions
    }

    /// Coerces the raw strings and ABI-encodes the call.
    pub fn encode_call(&self, raw_params: &[String]) -> Result<Vec<u8>, WalletError> {
        if raw_params.len() != self.input_types.len() {
            return Err(WalletError::validation(format!(
                "{} expects {} parameters, got {}",
                self.signature,
                self.input_types.len(),
                raw_params.len()
            )));
        }
        let values: Vec<Value> = self
            .coercions
            .iter()
            .zip(raw_params)
            .map(|(coercion, raw)| coercion.apply(raw))
            .collect();
        abi::encode_call(self.selector, &self.input_types, &values)
            .map_err(|e| WalletError::validation(format!("{}: {e}", self.signature)))
    }

    /// Decodes return data into JSON, integers as decimal strings.
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Value>, WalletError> {
        abi::decode(&self.output_types, data).map_err(|e| WalletError::Rpc {
            code: 0,
            message: format!("could not decode result of {}: {e}", self.signature),
            revert_reason: None,
        })
    }
}

/// A loaded contract: its address and functions split into read and write.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDescriptor {
    #[serde(serialize_with = "serialize_address")]
    pub address: Address,
    pub read: Vec<MethodDescriptor>,
    pub write: Vec<MethodDescriptor>,
}

fn serialize_address<S: serde::Serializer>(address: &Address, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&to_checksum(address))
}

impl ContractDescriptor {
    /// Looks a method up by full signature, or by name when the name is
    /// not overloaded.
    pub fn method(&self, name_or_signature: &str) -> Result<&MethodDescriptor, WalletError> {
        let all = || self.read.iter().chain(&self.write);
        if let Some(m) = all().find(|m| m.signature == name_or_signature) {
            return Ok(m);
        }
        let mut by_name = all().filter(|m| m.name == name_or_signature);
        match (by_name.next(), by_name.next()) {
            (Some(m), None) => Ok(m),
            (Some(_), Some(_)) => Err(WalletError::validation(format!(
                "{name_or_signature} is overloaded; use the full signature"
            ))),
            (None, _) => Err(WalletError::validation(format!(
                "no method {name_or_signature} in contract ABI"
            ))),
        }
    }
}

/// Parses `abi_json` and builds the descriptor for the contract at `address`.
/// Only `function` fragments are kept.
pub fn load(address: &str, abi_json: &str) -> Result<ContractDescriptor, WalletError> {
    let address = parse_address(address.trim())?;
    let fragments = abi::parse_abi(abi_json)
        .map_err(|e| WalletError::validation(format!("invalid ABI: {e}")))?;

    let mut read = Vec::new();
    let mut write = Vec::new();
    for fragment in fragments.iter().filter(|f| f.is_function()) {
        let method = MethodDescriptor::resolve(fragment)?;
        if method.is_read() {
            read.push(method);
        } else {
            write.push(method);
        }
    }
    debug!(
        "Loaded contract {} with {} read and {} write methods",
        to_checksum(&address),
        read.len(),
        write.len()
    );
    Ok(ContractDescriptor {
        address,
        read,
        write,
    })
}

/// Result of [`invoke`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InvocationResult {
    /// Decoded return values of a `view`/`pure` call.
    Read { values: Vec<Value> },
    /// Receipt of a mined state-changing call.
    Write { receipt: ReceiptSummary },
}

impl InvocationResult {
    /// A single output unwrapped, several as an array, none as `null`.
    pub fn display_value(&self) -> Value {
        match self {
            InvocationResult::Read { values } => match values.as_slice() {
                [] => Value::Null,
                [single] => single.clone(),
                many => Value::Array(many.to_vec()),
            },
            InvocationResult::Write { receipt } => {
                serde_json::to_value(receipt).unwrap_or(Value::Null)
            }
        }
    }
}

/// Calls `method` on `contract` with raw UI strings.
///
/// Reads are an `eth_call` against latest state and need no account. Writes
/// need the active signer, send zero value, and go through the same
/// estimate, balance check and receipt wait as a plain transaction.
pub async fn invoke(
    ctx: &WalletContext,
    contract: &ContractDescriptor,
    method: &MethodDescriptor,
    raw_params: &[String],
) -> Result<InvocationResult, WalletError> {
    let calldata = method.encode_call(raw_params)?;

    if method.is_read() {
        let request = CallRequest {
            from: ctx.account().map(|a| a.address),
            to: Some(contract.address),
            data: Some(calldata.into()),
            ..CallRequest::default()
        };
        let output = ctx.rpc().call(&request).await?;
        let values = method.decode_output(&output)?;
        return Ok(InvocationResult::Read { values });
    }

    ctx.require_signer()?;
    let mut intent = TransactionIntent::new(to_checksum(&contract.address), "0")
        .with_data(format!("0x{}", hex::encode(&calldata)));
    let mut builder = TransactionBuilder::new();
    builder.estimate_gas(&mut intent, ctx).await?;
    let receipt = builder.submit(&intent, ctx).await?;
    Ok(InvocationResult::Write { receipt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::signer::KeySigner;
    use eth_rpc::config::ClientSettings;
    use eth_rpc::scripted::ScriptedTransport;
    use eth_rpc::{EndpointConfig, ReceiptStatus, RpcError, RpcSession};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    const TOKEN: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn abi_json() -> String {
        json!([
            { "type": "function", "name": "balanceOf", "stateMutability": "view",
              "inputs": [{ "name": "owner", "type": "address" }],
              "outputs": [{ "name": "", "type": "uint256" }] },
            { "type": "function", "name": "add", "stateMutability": "pure",
              "inputs": [{ "name": "a", "type": "uint256" }, { "name": "b", "type": "uint256" }],
              "outputs": [{ "name": "", "type": "uint256" }] },
            { "type": "function", "name": "transfer", "stateMutability": "nonpayable",
              "inputs": [{ "name": "to", "type": "address" }, { "name": "amount", "type": "uint256" }],
              "outputs": [{ "name": "", "type": "bool" }] },
            { "type": "function", "name": "deposit", "stateMutability": "payable",
              "inputs": [], "outputs": [] },
            { "type": "event", "name": "Transfer", "anonymous": false,
              "inputs": [{ "name": "from", "type": "address", "indexed": true }] },
            { "type": "constructor", "inputs": [] }
        ])
        .to_string()
    }

    fn ctx(transport: &Arc<ScriptedTransport>, with_signer: bool) -> WalletContext {
        let settings = ClientSettings {
            receipt_poll_interval: Duration::from_millis(1),
            ..ClientSettings::default()
        };
        let rpc = RpcSession::new(
            EndpointConfig::new("https://rpc.example").unwrap(),
            transport.clone(),
            settings,
        );
        let signer = with_signer.then(|| Arc::new(KeySigner::import_from_private_key(KEY).unwrap()));
        WalletContext::new(Arc::new(rpc), signer)
    }

    #[test]
    fn load_partitions_by_mutability() {
        let contract = load(TOKEN, &abi_json()).unwrap();
        let read: Vec<&str> = contract.read.iter().map(|m| m.name.as_str()).collect();
        let write: Vec<&str> = contract.write.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(read, ["balanceOf", "add"]);
        assert_eq!(write, ["transfer", "deposit"]);
    }

    #[test]
    fn load_resolves_selectors() {
        let contract = load(TOKEN, &abi_json()).unwrap();
        let transfer = contract.method("transfer").unwrap();
        assert_eq!(transfer.signature, "transfer(address,uint256)");
        assert_eq!(transfer.selector_hex(), "0xa9059cbb");
        assert_eq!(transfer.coercions(), [Coercion::Address, Coercion::Integer]);
        assert_eq!(
            contract.method("balanceOf(address)").unwrap().selector_hex(),
            "0x70a08231"
        );
    }

    #[test]
    fn load_rejects_bad_input() {
        assert_eq!(load(TOKEN, "not json").unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(load(TOKEN, "{}").unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(load("0x1234", &abi_json()).unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn load_rejects_oversized_fixed_arrays() {
        for (inputs, outputs) in [
            (json!([{ "name": "a", "type": "uint256[576460752303423488]" }]), json!([])),
            (json!([]), json!([{ "name": "", "type": "uint256[576460752303423488]" }])),
        ] {
            let abi = json!([
                { "type": "function", "name": "f", "stateMutability": "view",
                  "inputs": inputs, "outputs": outputs }
            ])
            .to_string();
            assert_eq!(load(TOKEN, &abi).unwrap_err().kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn short_output_for_fixed_array_is_rpc_error() {
        let abi = json!([
            { "type": "function", "name": "f", "stateMutability": "view",
              "inputs": [], "outputs": [{ "name": "", "type": "uint256[3]" }] }
        ])
        .to_string();
        let contract = load(TOKEN, &abi).unwrap();
        let err = contract.method("f").unwrap().decode_output(&[0u8; 32]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rpc);
    }

    #[test]
    fn legacy_constant_flag_is_read() {
        let abi = r#"[{"name":"owner","constant":true,"inputs":[],"outputs":[{"name":"","type":"address"}]}]"#;
        let contract = load(TOKEN, abi).unwrap();
        assert_eq!(contract.read.len(), 1);
        assert!(contract.write.is_empty());
    }

    #[test]
    fn overloaded_names_need_signature() {
        let abi = json!([
            { "type": "function", "name": "f", "stateMutability": "view",
              "inputs": [{ "name": "a", "type": "uint8" }], "outputs": [] },
            { "type": "function", "name": "f", "stateMutability": "view",
              "inputs": [{ "name": "a", "type": "bytes" }], "outputs": [] }
        ])
        .to_string();
        let contract = load(TOKEN, &abi).unwrap();
        assert!(contract.method("f").is_err());
        assert!(contract.method("f(bytes)").is_ok());
        assert!(contract.method("g").is_err());
    }

    #[test]
    fn empty_strings_coerce_to_defaults() {
        assert_eq!(Coercion::Integer.apply(""), json!("0"));
        assert_eq!(Coercion::Bool.apply(""), json!(false));
        assert_eq!(Coercion::Address.apply(""), json!(ZERO_ADDRESS));
        assert_eq!(Coercion::Passthrough.apply(""), json!(""));
        assert_eq!(Coercion::Integer.apply("42"), json!("42"));
    }

    #[test]
    fn composite_parses_json_or_passes_through() {
        assert_eq!(Coercion::Composite.apply("[1, 2]"), json!([1, 2]));
        assert_eq!(Coercion::Composite.apply("[1, 2"), json!("[1, 2"));
    }

    #[test]
    fn coercions_follow_declared_types() {
        let abi = json!([
            { "type": "function", "name": "f", "stateMutability": "nonpayable",
              "inputs": [
                { "name": "a", "type": "int64" },
                { "name": "b", "type": "bool" },
                { "name": "c", "type": "string" },
                { "name": "d", "type": "uint256[]" },
                { "name": "e", "type": "tuple", "components": [{ "name": "x", "type": "address" }] },
                { "name": "g", "type": "bytes32" }
              ],
              "outputs": [] }
        ])
        .to_string();
        let contract = load(TOKEN, &abi).unwrap();
        assert_eq!(
            contract.method("f").unwrap().coercions(),
            [
                Coercion::Integer,
                Coercion::Bool,
                Coercion::Passthrough,
                Coercion::Composite,
                Coercion::Composite,
                Coercion::Passthrough,
            ]
        );
    }

    #[test]
    fn encode_rejects_wrong_arity() {
        let contract = load(TOKEN, &abi_json()).unwrap();
        let err = contract
            .method("transfer")
            .unwrap()
            .encode_call(&["0x000000000000000000000000000000000000dEaD".to_string()])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn read_call_decodes_large_integers_as_strings() {
        let transport = Arc::new(ScriptedTransport::new());
        // 2^128
        transport.push_ok(
            "eth_call",
            json!("0x0000000000000000000000000000000100000000000000000000000000000000"),
        );
        let contract = load(TOKEN, &abi_json()).unwrap();
        let method = contract.method("balanceOf").unwrap();

        let result = invoke(&ctx(&transport, false), &contract, method, &[String::new()])
            .await
            .unwrap();
        assert_eq!(
            result.display_value(),
            json!("340282366920938463463374607431768211456")
        );

        let call = &transport.calls()[0];
        assert_eq!(call.params[1], json!("latest"));
        assert_eq!(
            call.params[0]["data"],
            json!("0x70a082310000000000000000000000000000000000000000000000000000000000000000")
        );
    }

    #[tokio::test]
    async fn read_revert_carries_reason() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_err(
            "eth_call",
            RpcError::Node {
                code: 3,
                message: "execution reverted: paused".into(),
                data: None,
            },
        );
        let contract = load(TOKEN, &abi_json()).unwrap();
        let method = contract.method("add").unwrap();
        let err = invoke(&ctx(&transport, false), &contract, method, &["1".into(), "2".into()])
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some("paused"));
    }

    #[tokio::test]
    async fn write_requires_wallet() {
        let transport = Arc::new(ScriptedTransport::new());
        let contract = load(TOKEN, &abi_json()).unwrap();
        let method = contract.method("deposit").unwrap();
        let err = invoke(&ctx(&transport, false), &contract, method, &[])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn write_estimates_submits_and_reports_receipt() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("eth_gasPrice", json!("0x3b9aca00"));
        transport.respond("eth_getBlockByNumber", json!({ "number": "0x1" }));
        transport.respond("eth_estimateGas", json!("0xfde8"));
        transport.respond("eth_getBalance", json!("0xde0b6b3a7640000"));
        transport.respond("eth_chainId", json!("0x1"));
        transport.respond("eth_getTransactionCount", json!("0x7"));
        transport.push_ok("eth_sendRawTransaction", json!("0x1234"));
        transport.push_ok(
            "eth_getTransactionReceipt",
            json!({ "transactionHash": "0x1234", "blockNumber": "0x2", "gasUsed": "0xc350", "status": "0x1" }),
        );

        let contract = load(TOKEN, &abi_json()).unwrap();
        let method = contract.method("transfer").unwrap();
        let result = invoke(
            &ctx(&transport, true),
            &contract,
            method,
            &["0x000000000000000000000000000000000000dEaD".into(), "1000".into()],
        )
        .await
        .unwrap();

        match result {
            InvocationResult::Write { receipt } => {
                assert_eq!(receipt.transaction_hash, "0x1234");
                assert_eq!(receipt.gas_used, "50000");
                assert_eq!(receipt.status, ReceiptStatus::Success);
            }
            other => panic!("expected write result, got {other:?}"),
        }

        let estimate = transport
            .calls()
            .into_iter()
            .find(|c| c.method == "eth_estimateGas")
            .unwrap();
        assert_eq!(estimate.params[0]["to"], json!(TOKEN));
        assert_eq!(estimate.params[0]["value"], json!("0x0"));
        assert!(estimate.params[0]["data"]
            .as_str()
            .unwrap()
            .starts_with("0xa9059cbb"));
    }
}
