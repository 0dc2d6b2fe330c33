use serde::Serialize;
use serde_json::Value;

use crate::error::WalletError;

/// Solidity's usual constructor preamble (`PUSH1 0x80 PUSH1 0x40 MSTORE`).
const CONSTRUCTOR_PATTERN: &str = "6080604052";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSummary {
    pub name: String,
    /// `"<type> <name>"` per parameter.
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub name: String,
    /// `"<type> <name>"`, suffixed ` (indexed)` for indexed parameters.
    pub inputs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BytecodeAnalysis {
    /// Characters of the cleaned bytecode, `0x` included.
    pub bytecode_length: usize,
    /// Bytes.
    pub bytecode_size: usize,
    pub has_constructor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<FunctionSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<EventSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abi_error: Option<String>,
}

/// Strips all whitespace; the rest must be `0x` followed by hex digits.
pub fn clean_bytecode(bytecode: &str) -> Result<String, WalletError> {
    let cleaned: String = bytecode.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(WalletError::validation("bytecode is required"));
    }
    let valid = cleaned
        .strip_prefix("0x")
        .is_some_and(|digits| digits.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(WalletError::validation(
            "invalid bytecode format: must start with 0x and contain only hex characters",
        ));
    }
    Ok(cleaned)
}

/// Summarizes deployed or creation bytecode, plus the ABI's functions and
/// events when one is given.
///
/// ABI text that is not JSON is rejected; JSON that is not a fragment array
/// is reported in `abi_error` alongside the bytecode figures.
pub fn analyze_bytecode(bytecode: &str, abi: Option<&str>) -> Result<BytecodeAnalysis, WalletError> {
    let cleaned = clean_bytecode(bytecode)?;
    let abi = match abi.map(str::trim).filter(|a| !a.is_empty()) {
        Some(text) => Some(
            serde_json::from_str::<Value>(text)
                .map_err(|e| WalletError::validation(format!("invalid ABI JSON format: {e}")))?,
        ),
        None => None,
    };

    let mut analysis = BytecodeAnalysis {
        bytecode_length: cleaned.len(),
        bytecode_size: (cleaned.len() - 2) / 2,
        has_constructor: cleaned.contains(CONSTRUCTOR_PATTERN),
        functions: None,
        events: None,
        abi_error: None,
    };

    if let Some(abi) = abi {
        match abi.as_array() {
            Some(items) => {
                let (functions, events) = summarize(items);
                analysis.functions = Some(functions);
                analysis.events = Some(events);
            }
            None => {
                analysis.abi_error = Some("Could not parse ABI: expected a JSON array".into());
            }
        }
    }
    Ok(analysis)
}

fn summarize(items: &[Value]) -> (Vec<FunctionSummary>, Vec<EventSummary>) {
    let mut functions = Vec::new();
    let mut events = Vec::new();
    for item in items {
        let name = text(item, "name").to_string();
        match text(item, "type") {
            "function" => functions.push(FunctionSummary {
                name,
                inputs: params(item, "inputs", false),
                outputs: params(item, "outputs", false),
                state_mutability: item
                    .get("stateMutability")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            "event" => events.push(EventSummary {
                name,
                inputs: params(item, "inputs", true),
            }),
            _ => {}
        }
    }
    (functions, events)
}

fn text<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn params(item: &Value, key: &str, mark_indexed: bool) -> Vec<String> {
    let Some(list) = item.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    list.iter()
        .map(|p| {
            let indexed = mark_indexed && p.get("indexed").and_then(Value::as_bool).unwrap_or(false);
            format!(
                "{} {}{}",
                text(p, "type"),
                text(p, "name"),
                if indexed { " (indexed)" } else { "" }
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn whitespace_is_stripped() {
        let analysis = analyze_bytecode("0x6080 6040\n52 00", None).unwrap();
        assert_eq!(analysis.bytecode_length, 14);
        assert_eq!(analysis.bytecode_size, 6);
        assert!(analysis.has_constructor);
        assert!(analysis.functions.is_none());
    }

    #[test]
    fn runtime_code_without_preamble() {
        let analysis = analyze_bytecode("0x6001600201", None).unwrap();
        assert!(!analysis.has_constructor);
        assert_eq!(analysis.bytecode_size, 5);
    }

    #[test]
    fn malformed_bytecode_rejected() {
        for bad in ["", "   ", "6080", "0x60zz"] {
            assert_eq!(
                analyze_bytecode(bad, None).unwrap_err().kind(),
                ErrorKind::Validation,
                "{bad:?}"
            );
        }
        assert_eq!(analyze_bytecode("0x", None).unwrap().bytecode_size, 0);
    }

    #[test]
    fn abi_functions_and_events_listed() {
        let abi = json!([
            { "type": "function", "name": "transfer", "stateMutability": "nonpayable",
              "inputs": [{ "name": "to", "type": "address" }, { "name": "amount", "type": "uint256" }],
              "outputs": [{ "name": "", "type": "bool" }] },
            { "type": "event", "name": "Transfer",
              "inputs": [
                { "name": "from", "type": "address", "indexed": true },
                { "name": "value", "type": "uint256", "indexed": false }
              ] },
            { "type": "constructor", "inputs": [] }
        ])
        .to_string();

        let analysis = analyze_bytecode("0x60806040", Some(&abi)).unwrap();
        let functions = analysis.functions.unwrap();
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].inputs, ["address to", "uint256 amount"]);
        assert_eq!(functions[0].outputs, ["bool "]);
        assert_eq!(functions[0].state_mutability.as_deref(), Some("nonpayable"));

        let events = analysis.events.unwrap();
        assert_eq!(events[0].inputs, ["address from (indexed)", "uint256 value"]);
    }

    #[test]
    fn non_array_abi_reported_not_fatal() {
        let analysis = analyze_bytecode("0x00", Some("{\"a\": 1}")).unwrap();
        assert!(analysis.abi_error.is_some());
        assert_eq!(analysis.bytecode_size, 1);
    }

    #[test]
    fn invalid_abi_json_rejected() {
        let err = analyze_bytecode("0x00", Some("[oops")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(analyze_bytecode("0x00", None).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({ "bytecodeLength": 4, "bytecodeSize": 1, "hasConstructor": false })
        );
    }
}
