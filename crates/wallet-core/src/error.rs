use chain_eth::EthError;
use crypto_utils::CryptoError;
use eth_rpc::RpcError;
use serde::Serialize;
use thiserror::Error;

/// Discriminant of [`WalletError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Validation,
    Precondition,
    Connection,
    Rpc,
    InsufficientFunds,
    Storage,
}

#[derive(Debug, Clone, Error)]
pub enum WalletError {
    /// Malformed key, mnemonic, ABI, address or parameter. Never reaches the
    /// network.
    #[error("{0}")]
    Validation(String),

    /// Operation attempted without the state it needs.
    #[error("{0}")]
    Precondition(String),

    #[error("connection error: {0}")]
    Connection(String),

    /// The node rejected the request. `message` keeps the node's text so a
    /// revert can be rendered even when no reason could be decoded.
    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        revert_reason: Option<String>,
    },

    #[error("insufficient funds: need {required} wei, have {available} wei")]
    InsufficientFunds { required: String, available: String },

    #[error("storage error: {0}")]
    Storage(String),
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::Validation(_) => ErrorKind::Validation,
            WalletError::Precondition(_) => ErrorKind::Precondition,
            WalletError::Connection(_) => ErrorKind::Connection,
            WalletError::Rpc { .. } => ErrorKind::Rpc,
            WalletError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            WalletError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            WalletError::Rpc { revert_reason, .. } => revert_reason.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        WalletError::Validation(message.into())
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        WalletError::Precondition(message.into())
    }
}

impl From<CryptoError> for WalletError {
    fn from(e: CryptoError) -> Self {
        WalletError::Validation(e.to_string())
    }
}

impl From<EthError> for WalletError {
    fn from(e: EthError) -> Self {
        WalletError::Validation(e.to_string())
    }
}

impl From<RpcError> for WalletError {
    fn from(e: RpcError) -> Self {
        let revert_reason = e.revert_reason();
        match e {
            RpcError::Connection(msg) | RpcError::Timeout(msg) => WalletError::Connection(msg),
            RpcError::Node { code, message, .. } => WalletError::Rpc {
                code,
                message,
                revert_reason,
            },
            RpcError::InvalidResponse(msg) => WalletError::Rpc {
                code: 0,
                message: msg,
                revert_reason: None,
            },
            RpcError::InvalidEndpoint(msg) => WalletError::Validation(msg),
            RpcError::Store(msg) => WalletError::Storage(msg),
        }
    }
}
