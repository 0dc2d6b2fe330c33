use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::{ClientSettings, EndpointConfig};
use crate::error::RpcError;

/// Something that can answer JSON-RPC requests.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends one request and returns its `result` member.
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

/// Builds a transport for an endpoint. Swapping endpoints goes through this.
pub trait Connector: Send + Sync {
    fn connect(
        &self,
        endpoint: &EndpointConfig,
        settings: &ClientSettings,
    ) -> Result<Arc<dyn Transport>, RpcError>;
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// JSON-RPC 2.0 over HTTP POST.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(endpoint: &EndpointConfig, settings: &ClientSettings) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| RpcError::Connection(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: endpoint.as_str().to_string(),
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "json-rpc request");

        let payload = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params: &params,
        };

        let resp = self.client.post(&self.url).json(&payload).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        let body: Value = match serde_json::from_slice(&bytes) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(RpcError::Connection(format!("HTTP {status}")));
            }
            Err(e) => {
                return Err(RpcError::InvalidResponse(format!(
                    "{method}: body is not JSON: {e}"
                )))
            }
        };

        if let Some(error) = body.get("error") {
            let error: JsonRpcErrorObject = serde_json::from_value(error.clone()).map_err(|e| {
                RpcError::InvalidResponse(format!("{method}: malformed error object: {e}"))
            })?;
            debug!(method, id, code = error.code, "json-rpc error");
            return Err(RpcError::Node {
                code: error.code,
                message: error.message,
                data: error.data,
            });
        }

        if !status.is_success() {
            return Err(RpcError::Connection(format!("HTTP {status}")));
        }

        body.get("result").cloned().ok_or_else(|| {
            RpcError::InvalidResponse(format!("{method}: response has neither result nor error"))
        })
    }
}

/// Connects every endpoint over HTTP.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    fn connect(
        &self,
        endpoint: &EndpointConfig,
        settings: &ClientSettings,
    ) -> Result<Arc<dyn Transport>, RpcError> {
        Ok(Arc::new(HttpTransport::new(endpoint, settings)?))
    }
}
