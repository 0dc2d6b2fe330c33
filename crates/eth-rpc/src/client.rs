use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use chain_eth::address::to_checksum;
use chain_eth::chains::get_network;
use parking_lot::RwLock;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::{ClientSettings, EndpointConfig, EndpointStore};
use crate::error::RpcError;
use crate::transport::{Connector, HttpConnector, Transport};
use crate::types::{
    expect_bytes, expect_quantity, quantity_u64, CallRequest, FeeQuote, NetworkDescriptor,
    TransactionReceipt,
};

/// Priority fee assumed when the node has no `eth_maxPriorityFeePerGas`.
pub const DEFAULT_PRIORITY_FEE_WEI: u64 = 1_000_000_000;

/// An immutable view of one endpoint: its config, transport and the network
/// detected for it. Operations take one of these at call start and use it to
/// completion, so an endpoint switch never affects an in-flight operation.
#[derive(Debug, Clone)]
pub struct RpcSession {
    endpoint: EndpointConfig,
    transport: Arc<dyn Transport>,
    network: NetworkDescriptor,
    settings: ClientSettings,
}

impl RpcSession {
    pub fn new(endpoint: EndpointConfig, transport: Arc<dyn Transport>, settings: ClientSettings) -> Self {
        Self {
            endpoint,
            transport,
            network: NetworkDescriptor::unknown(),
            settings,
        }
    }

    /// Same session with a different cached network.
    pub fn with_network(&self, network: NetworkDescriptor) -> Self {
        Self {
            network,
            ..self.clone()
        }
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    pub fn network(&self) -> &NetworkDescriptor {
        &self.network
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Idempotent read, retried per the session's policy.
    async fn read(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let transport = &self.transport;
        let params = &params;
        self.settings
            .retry
            .run(method, move || transport.request(method, params.clone()))
            .await
    }

    /// Generic passthrough for any JSON-RPC method. Single attempt: the
    /// method may have side effects.
    pub async fn send(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.transport.request(method, params).await
    }

    pub async fn get_block_number(&self) -> Result<u64, RpcError> {
        let result = self.read("eth_blockNumber", json!([])).await?;
        quantity_u64(result.as_str().unwrap_or_default())
    }

    pub async fn chain_id(&self) -> Result<u64, RpcError> {
        let result = self.read("eth_chainId", json!([])).await?;
        quantity_u64(result.as_str().unwrap_or_default())
    }

    /// Works out which chain the endpoint serves. Tries `eth_chainId`, then
    /// `net_version`; falls back to the unknown sentinel.
    pub async fn detect_network(&self) -> NetworkDescriptor {
        let chain_id = match self.chain_id().await {
            Ok(id) => Some(id),
            Err(e) => {
                debug!("eth_chainId failed ({e}), trying net_version");
                match self.read("net_version", json!([])).await {
                    Ok(Value::String(v)) => v.trim().parse::<u64>().ok(),
                    Ok(other) => other.as_u64(),
                    Err(e) => {
                        warn!("Network detection failed for {}: {e}", self.endpoint);
                        None
                    }
                }
            }
        };

        match chain_id {
            Some(chain_id) => NetworkDescriptor {
                chain_id,
                name: get_network(chain_id)
                    .map(|n| n.name.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            },
            None => NetworkDescriptor::unknown(),
        }
    }

    /// Balance in wei. Returns zero without a network call while the endpoint
    /// is still the unconfigured placeholder.
    pub async fn get_balance(&self, address: Address) -> Result<U256, RpcError> {
        if self.endpoint.is_placeholder() {
            debug!("Skipping eth_getBalance: endpoint not configured");
            return Ok(U256::ZERO);
        }
        let result = self
            .read("eth_getBalance", json!([to_checksum(&address), "latest"]))
            .await?;
        expect_quantity("eth_getBalance", &result)
    }

    /// Next nonce for `address`, counting pending transactions.
    pub async fn get_transaction_count(&self, address: Address) -> Result<u64, RpcError> {
        let result = self
            .read(
                "eth_getTransactionCount",
                json!([to_checksum(&address), "pending"]),
            )
            .await?;
        quantity_u64(result.as_str().unwrap_or_default())
    }

    pub async fn get_code(&self, address: Address) -> Result<Bytes, RpcError> {
        let result = self
            .read("eth_getCode", json!([to_checksum(&address), "latest"]))
            .await?;
        expect_bytes("eth_getCode", &result)
    }

    pub async fn gas_price(&self) -> Result<U256, RpcError> {
        let result = self.read("eth_gasPrice", json!([])).await?;
        expect_quantity("eth_gasPrice", &result)
    }

    pub async fn max_priority_fee(&self) -> Result<U256, RpcError> {
        let result = self.read("eth_maxPriorityFeePerGas", json!([])).await?;
        expect_quantity("eth_maxPriorityFeePerGas", &result)
    }

    /// Current fee suggestion.
    ///
    /// `gas_price` always comes from `eth_gasPrice`. When the latest block
    /// carries a base fee, the EIP-1559 pair is filled in as
    /// `max_fee = 2 * base_fee + priority`.
    pub async fn get_fee_data(&self) -> Result<FeeQuote, RpcError> {
        let gas_price = self.gas_price().await?;

        let base_fee = self
            .get_block_by_number("latest", false)
            .await?
            .as_ref()
            .and_then(|block| block.get("baseFeePerGas"))
            .map(|fee| expect_quantity("baseFeePerGas", fee))
            .transpose()?;

        let Some(base_fee) = base_fee else {
            return Ok(FeeQuote {
                gas_price: Some(gas_price),
                ..FeeQuote::default()
            });
        };

        let priority = match self.max_priority_fee().await {
            Ok(priority) => priority,
            Err(RpcError::Node { message, .. }) => {
                debug!("eth_maxPriorityFeePerGas unsupported ({message}), using 1 gwei");
                U256::from(DEFAULT_PRIORITY_FEE_WEI)
            }
            Err(e) => return Err(e),
        };

        Ok(FeeQuote {
            gas_price: Some(gas_price),
            max_fee_per_gas: Some(
                base_fee
                    .saturating_mul(U256::from(2u64))
                    .saturating_add(priority),
            ),
            max_priority_fee_per_gas: Some(priority),
        })
    }

    pub async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, RpcError> {
        let result = self
            .read("eth_estimateGas", json!([request.to_json()]))
            .await?;
        quantity_u64(result.as_str().unwrap_or_default())
    }

    /// `eth_call` against the latest block.
    pub async fn call(&self, request: &CallRequest) -> Result<Bytes, RpcError> {
        let result = self
            .read("eth_call", json!([request.to_json(), "latest"]))
            .await?;
        expect_bytes("eth_call", &result)
    }

    /// Broadcasts a signed transaction. Never retried, so a transaction is
    /// broadcast at most once per call.
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<String, RpcError> {
        let result = self
            .send(
                "eth_sendRawTransaction",
                json!([format!("0x{}", hex::encode(raw))]),
            )
            .await?;
        result.as_str().map(str::to_string).ok_or_else(|| {
            RpcError::InvalidResponse(format!("eth_sendRawTransaction: unexpected result {result}"))
        })
    }

    /// `None` while the transaction is not yet mined.
    pub async fn get_transaction_receipt(&self, hash: &str) -> Result<Option<TransactionReceipt>, RpcError> {
        let result = self.read("eth_getTransactionReceipt", json!([hash])).await?;
        if result.is_null() {
            return Ok(None);
        }
        TransactionReceipt::from_json(&result).map(Some)
    }

    pub async fn get_transaction_by_hash(&self, hash: &str) -> Result<Option<Value>, RpcError> {
        let result = self.read("eth_getTransactionByHash", json!([hash])).await?;
        Ok((!result.is_null()).then_some(result))
    }

    /// Block by tag (`latest`, `pending`, ...) or hex number.
    pub async fn get_block_by_number(&self, block: &str, full_transactions: bool) -> Result<Option<Value>, RpcError> {
        let result = self
            .read("eth_getBlockByNumber", json!([block, full_transactions]))
            .await?;
        Ok((!result.is_null()).then_some(result))
    }

    /// Lightweight liveness probe: `eth_blockNumber` raced against the
    /// connection-test timeout. Never fails; the placeholder endpoint is
    /// reported unreachable without a call.
    pub async fn test_connection(&self) -> bool {
        if self.endpoint.is_placeholder() {
            debug!("Skipping connection test: endpoint not configured");
            return false;
        }
        let probe = self.transport.request("eth_blockNumber", json!([]));
        match tokio::time::timeout(self.settings.connection_test_timeout, probe).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("Connection test to {} failed: {e}", self.endpoint);
                false
            }
            Err(_) => {
                debug!(
                    "Connection test to {} timed out after {:?}",
                    self.endpoint, self.settings.connection_test_timeout
                );
                false
            }
        }
    }
}

/// Owner of the active endpoint.
///
/// Switching endpoints builds a new [`RpcSession`] and swaps it in; sessions
/// already handed out keep working against the endpoint they were taken from.
pub struct RpcClient {
    active: RwLock<Arc<RpcSession>>,
    store: Arc<dyn EndpointStore>,
    connector: Arc<dyn Connector>,
    settings: ClientSettings,
}

impl RpcClient {
    /// Client over HTTP, starting from the persisted endpoint or the
    /// placeholder.
    pub fn new(store: Arc<dyn EndpointStore>, settings: ClientSettings) -> Result<Self, RpcError> {
        Self::with_connector(store, Arc::new(HttpConnector), settings)
    }

    pub fn with_connector(
        store: Arc<dyn EndpointStore>,
        connector: Arc<dyn Connector>,
        settings: ClientSettings,
    ) -> Result<Self, RpcError> {
        let endpoint = match store.load()? {
            Some(url) => match EndpointConfig::new(&url) {
                Ok(endpoint) => endpoint,
                Err(e) => {
                    warn!("Ignoring persisted endpoint: {e}");
                    EndpointConfig::placeholder()
                }
            },
            None => EndpointConfig::placeholder(),
        };
        let transport = connector.connect(&endpoint, &settings)?;
        let session = RpcSession::new(endpoint, transport, settings.clone());

        Ok(Self {
            active: RwLock::new(Arc::new(session)),
            store,
            connector,
            settings,
        })
    }

    /// Snapshot of the active endpoint for one operation.
    pub fn session(&self) -> Arc<RpcSession> {
        self.active.read().clone()
    }

    pub fn current_endpoint(&self) -> String {
        self.session().endpoint().as_str().to_string()
    }

    /// Cached network of the active endpoint.
    pub fn network(&self) -> NetworkDescriptor {
        self.session().network().clone()
    }

    /// Replaces the endpoint, persists it and re-derives the network.
    ///
    /// Detection failure is not an error: the network stays at the unknown
    /// sentinel.
    pub async fn set_endpoint(&self, url: &str) -> Result<NetworkDescriptor, RpcError> {
        let endpoint = EndpointConfig::new(url)?;
        let transport = self.connector.connect(&endpoint, &self.settings)?;
        self.store.save(endpoint.as_str())?;

        let session = Arc::new(RpcSession::new(endpoint, transport, self.settings.clone()));
        *self.active.write() = session.clone();
        info!("Switched RPC endpoint to {}", session.endpoint());

        Ok(self.install_network(&session).await)
    }

    /// Re-runs network detection for the active endpoint.
    pub async fn refresh_network(&self) -> NetworkDescriptor {
        let session = self.session();
        self.install_network(&session).await
    }

    async fn install_network(&self, session: &Arc<RpcSession>) -> NetworkDescriptor {
        let network = session.detect_network().await;
        let mut active = self.active.write();
        // A newer endpoint may have been installed meanwhile; leave it alone.
        if Arc::ptr_eq(&active, session) {
            *active = Arc::new(session.with_network(network.clone()));
        }
        network
    }

    /// Probes `url`, or the active endpoint when `None`. Never fails.
    pub async fn test_connection(&self, url: Option<&str>) -> bool {
        let active = self.session();
        let Some(url) = url else {
            return active.test_connection().await;
        };
        if url.trim() == active.endpoint().as_str() {
            return active.test_connection().await;
        }

        let endpoint = match EndpointConfig::new(url) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                debug!("Connection test skipped: {e}");
                return false;
            }
        };
        match self.connector.connect(&endpoint, &self.settings) {
            Ok(transport) => {
                RpcSession::new(endpoint, transport, self.settings.clone())
                    .test_connection()
                    .await
            }
            Err(e) => {
                debug!("Connection test could not connect: {e}");
                false
            }
        }
    }

    pub async fn get_balance(&self, address: Address) -> Result<U256, RpcError> {
        self.session().get_balance(address).await
    }

    pub async fn get_block_number(&self) -> Result<u64, RpcError> {
        self.session().get_block_number().await
    }

    pub async fn get_fee_data(&self) -> Result<FeeQuote, RpcError> {
        self.session().get_fee_data().await
    }

    pub async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, RpcError> {
        self.session().estimate_gas(request).await
    }

    pub async fn send(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.session().send(method, params).await
    }
}
