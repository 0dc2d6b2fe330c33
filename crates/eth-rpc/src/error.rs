use chain_eth::abi::decode_revert_reason;
use chain_eth::EthError;
use serde_json::Value;
use thiserror::Error;

/// Failures talking to a JSON-RPC endpoint.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    /// The node answered with a JSON-RPC error object.
    #[error("node error {code}: {message}")]
    Node {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("endpoint store error: {0}")]
    Store(String),
}

impl RpcError {
    /// Only transport-level failures are worth another attempt; a node error
    /// will come back the same way.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RpcError::Connection(_) | RpcError::Timeout(_))
    }

    /// Revert reason carried by a node error, if any.
    ///
    /// Looks at ABI-encoded `Error(string)`/`Panic(uint256)` revert data first,
    /// then at the `execution reverted: <reason>` message form.
    pub fn revert_reason(&self) -> Option<String> {
        let RpcError::Node { message, data, .. } = self else {
            return None;
        };

        data.as_ref()
            .and_then(revert_data_bytes)
            .and_then(|bytes| decode_revert_reason(&bytes))
            .or_else(|| {
                message
                    .strip_prefix("execution reverted: ")
                    .map(str::to_string)
            })
    }
}

/// Revert bytes either sit directly in `data` or one level down in
/// `data.data`, depending on the node implementation.
fn revert_data_bytes(data: &Value) -> Option<Vec<u8>> {
    match data {
        Value::String(s) => s.strip_prefix("0x").and_then(|h| hex::decode(h).ok()),
        Value::Object(map) => map.get("data").and_then(revert_data_bytes),
        _ => None,
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RpcError::Timeout(e.to_string())
        } else {
            RpcError::Connection(e.to_string())
        }
    }
}

impl From<EthError> for RpcError {
    fn from(e: EthError) -> Self {
        RpcError::InvalidResponse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(message: &str, data: Option<Value>) -> RpcError {
        RpcError::Node {
            code: 3,
            message: message.into(),
            data,
        }
    }

    #[test]
    fn display_node_error() {
        let err = node("execution reverted", None);
        assert_eq!(err.to_string(), "node error 3: execution reverted");
    }

    #[test]
    fn display_connection_error() {
        let err = RpcError::Connection("refused".into());
        assert_eq!(err.to_string(), "connection failed: refused");
    }

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(RpcError::Connection("x".into()).is_retryable());
        assert!(RpcError::Timeout("x".into()).is_retryable());
        assert!(!node("nonce too low", None).is_retryable());
        assert!(!RpcError::InvalidResponse("x".into()).is_retryable());
    }

    #[test]
    fn revert_reason_from_encoded_data() {
        // Error("nope")
        let data = concat!(
            "0x08c379a0",
            "0000000000000000000000000000000000000000000000000000000000000020",
            "0000000000000000000000000000000000000000000000000000000000000004",
            "6e6f706500000000000000000000000000000000000000000000000000000000",
        );
        let err = node("execution reverted", Some(json!(data)));
        assert_eq!(err.revert_reason().as_deref(), Some("nope"));
    }

    #[test]
    fn revert_reason_from_nested_data() {
        let data = concat!(
            "0x4e487b71",
            "0000000000000000000000000000000000000000000000000000000000000001",
        );
        let err = node("VM Exception", Some(json!({ "data": data })));
        assert_eq!(
            err.revert_reason().as_deref(),
            Some("panic 0x01: assertion failed")
        );
    }

    #[test]
    fn revert_reason_from_message() {
        let err = node("execution reverted: Ownable: caller is not the owner", None);
        assert_eq!(
            err.revert_reason().as_deref(),
            Some("Ownable: caller is not the owner")
        );
    }

    #[test]
    fn no_revert_reason_for_other_errors() {
        assert_eq!(RpcError::Timeout("5s".into()).revert_reason(), None);
        assert_eq!(node("nonce too low", None).revert_reason(), None);
    }
}
