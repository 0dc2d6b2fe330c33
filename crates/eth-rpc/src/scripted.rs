//! In-process transport that answers from a script instead of a node.
//!
//! Used by the test suites of this workspace and by embedders that want to
//! drive the wallet against canned data.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::config::{ClientSettings, EndpointConfig};
use crate::error::RpcError;
use crate::transport::{Connector, Transport};

/// JSON-RPC code returned for methods with no script.
pub const METHOD_NOT_FOUND: i64 = -32601;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
}

#[derive(Debug, Default)]
struct Script {
    queued: HashMap<String, VecDeque<Result<Value, RpcError>>>,
    sticky: HashMap<String, Result<Value, RpcError>>,
    calls: Vec<RecordedCall>,
}

/// Queued responses are consumed first, then the sticky response for the
/// method, if any. Anything else answers "method not found".
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a one-shot successful result.
    pub fn push_ok(&self, method: &str, result: Value) {
        self.push(method, Ok(result));
    }

    /// Queues a one-shot failure.
    pub fn push_err(&self, method: &str, error: RpcError) {
        self.push(method, Err(error));
    }

    fn push(&self, method: &str, response: Result<Value, RpcError>) {
        self.script
            .lock()
            .queued
            .entry(method.to_string())
            .or_default()
            .push_back(response);
    }

    /// Answers every call to `method` with `result` once the queue is empty.
    pub fn respond(&self, method: &str, result: Value) {
        self.script
            .lock()
            .sticky
            .insert(method.to_string(), Ok(result));
    }

    /// Like [`respond`](Self::respond) but with a standing failure.
    pub fn fail(&self, method: &str, error: RpcError) {
        self.script
            .lock()
            .sticky
            .insert(method.to_string(), Err(error));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script.lock().calls.clone()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.script
            .lock()
            .calls
            .iter()
            .filter(|c| c.method == method)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let mut script = self.script.lock();
        script.calls.push(RecordedCall {
            method: method.to_string(),
            params,
        });

        if let Some(response) = script.queued.get_mut(method).and_then(VecDeque::pop_front) {
            return response;
        }
        if let Some(response) = script.sticky.get(method) {
            return response.clone();
        }
        Err(RpcError::Node {
            code: METHOD_NOT_FOUND,
            message: format!("the method {method} does not exist/is not available"),
            data: None,
        })
    }
}

/// Hands out the same scripted transport for every endpoint.
#[derive(Debug, Clone)]
pub struct ScriptedConnector {
    transport: Arc<ScriptedTransport>,
}

impl ScriptedConnector {
    pub fn new(transport: Arc<ScriptedTransport>) -> Self {
        Self { transport }
    }
}

impl Connector for ScriptedConnector {
    fn connect(
        &self,
        _endpoint: &EndpointConfig,
        _settings: &ClientSettings,
    ) -> Result<Arc<dyn Transport>, RpcError> {
        Ok(self.transport.clone())
    }
}
