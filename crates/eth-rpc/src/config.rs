use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::error::RpcError;
use crate::retry::RetryPolicy;

/// Endpoint used until the user configures one. Network calls that would go
/// to it are skipped.
pub const PLACEHOLDER_URL: &str = "http://localhost:8545";

/// Key under which the endpoint URL is persisted.
pub const ENDPOINT_KEY: &str = "rpcUrl";

/// A validated JSON-RPC endpoint. Replaced wholesale, never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    raw: String,
}

impl EndpointConfig {
    /// Validates and wraps an endpoint URL. Only `http`/`https` URLs with a
    /// host are accepted.
    pub fn new(url: &str) -> Result<Self, RpcError> {
        let raw = url.trim();
        let parsed = Url::parse(raw).map_err(|e| RpcError::InvalidEndpoint(format!("{raw}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
            return Err(RpcError::InvalidEndpoint(format!(
                "{raw}: expected an http or https URL with a host"
            )));
        }
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    pub fn placeholder() -> Self {
        Self {
            raw: PLACEHOLDER_URL.to_string(),
        }
    }

    /// The URL exactly as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_placeholder(&self) -> bool {
        self.raw == PLACEHOLDER_URL
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EndpointConfig").field(&self.raw).finish()
    }
}

impl fmt::Display for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Validate that a URL is well-formed and uses HTTP or HTTPS.
pub fn validate_url(url: &str) -> bool {
    EndpointConfig::new(url).is_ok()
}

/// Timeouts and policies shared by every session of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Upper bound for a single HTTP request.
    pub request_timeout: Duration,
    /// Upper bound for `test_connection`.
    pub connection_test_timeout: Duration,
    /// Applied to idempotent reads only.
    pub retry: RetryPolicy,
    /// How often a pending transaction polls for its receipt.
    pub receipt_poll_interval: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connection_test_timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
            receipt_poll_interval: Duration::from_secs(2),
        }
    }
}

/// Where the single configured endpoint URL lives between runs.
pub trait EndpointStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, RpcError>;
    fn save(&self, url: &str) -> Result<(), RpcError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedEndpoint {
    #[serde(rename = "rpcUrl")]
    rpc_url: String,
}

/// JSON file store: `{ "rpcUrl": "<url>" }`.
#[derive(Debug, Clone)]
pub struct FileEndpointStore {
    path: PathBuf,
}

impl FileEndpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.evm-dashboard/endpoint.json`.
    pub fn default_location() -> Result<Self, RpcError> {
        let home = dirs::home_dir()
            .ok_or_else(|| RpcError::Store("could not determine home directory".into()))?;
        Ok(Self::new(home.join(".evm-dashboard").join("endpoint.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EndpointStore for FileEndpointStore {
    fn load(&self) -> Result<Option<String>, RpcError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| RpcError::Store(format!("failed to read {}: {e}", self.path.display())))?;
        let persisted: PersistedEndpoint = serde_json::from_str(&content)
            .map_err(|e| RpcError::Store(format!("failed to parse {}: {e}", self.path.display())))?;
        info!("Loaded endpoint from {}", self.path.display());
        Ok(Some(persisted.rpc_url))
    }

    fn save(&self, url: &str) -> Result<(), RpcError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                RpcError::Store(format!("failed to create directory {}: {e}", dir.display()))
            })?;
        }
        let content = serde_json::to_string_pretty(&PersistedEndpoint {
            rpc_url: url.to_string(),
        })
        .map_err(|e| RpcError::Store(e.to_string()))?;
        std::fs::write(&self.path, content)
            .map_err(|e| RpcError::Store(format!("failed to write {}: {e}", self.path.display())))
    }
}

/// In-memory store for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryEndpointStore {
    url: Mutex<Option<String>>,
}

impl MemoryEndpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(url: &str) -> Self {
        Self {
            url: Mutex::new(Some(url.to_string())),
        }
    }
}

impl EndpointStore for MemoryEndpointStore {
    fn load(&self) -> Result<Option<String>, RpcError> {
        Ok(self.url.lock().clone())
    }

    fn save(&self, url: &str) -> Result<(), RpcError> {
        *self.url.lock() = Some(url.to_string());
        Ok(())
    }
}
