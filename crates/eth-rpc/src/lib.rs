//! JSON-RPC access to EVM nodes.
//!
//! One configured endpoint at a time. The active endpoint is persisted through
//! an [`EndpointStore`] and replaced atomically by [`RpcClient::set_endpoint`];
//! operations run against an [`RpcSession`] snapshot so a switch never
//! disturbs work already in flight.

pub mod client;
pub mod config;
pub mod error;
pub mod retry;
pub mod scripted;
pub mod transport;
pub mod types;

pub use client::{RpcClient, RpcSession};
pub use config::{
    validate_url, ClientSettings, EndpointConfig, EndpointStore, FileEndpointStore,
    MemoryEndpointStore, PLACEHOLDER_URL,
};
pub use error::RpcError;
pub use retry::RetryPolicy;
pub use transport::{Connector, HttpConnector, HttpTransport, Transport};
pub use types::{CallRequest, FeeQuote, NetworkDescriptor, ReceiptStatus, TransactionReceipt};
