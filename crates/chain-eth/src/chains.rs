use serde::Serialize;

/// A well-known EVM network, used to label whatever chain an endpoint reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnownNetwork {
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub is_testnet: bool,
}

const fn network(chain_id: u64, name: &'static str, symbol: &'static str, is_testnet: bool) -> KnownNetwork {
    KnownNetwork {
        chain_id,
        name,
        symbol,
        is_testnet,
    }
}

const KNOWN_NETWORKS: &[KnownNetwork] = &[
    network(1, "Ethereum Mainnet", "ETH", false),
    network(11155111, "Sepolia Testnet", "ETH", true),
    network(5, "Goerli Testnet", "ETH", true),
    network(137, "Polygon", "MATIC", false),
    network(80001, "Polygon Mumbai", "MATIC", true),
    network(42161, "Arbitrum", "ETH", false),
    network(421613, "Arbitrum Goerli", "ETH", true),
    network(10, "Optimism", "ETH", false),
    network(420, "Optimism Goerli", "ETH", true),
    network(56, "Binance Smart Chain", "BNB", false),
    network(97, "BSC Testnet", "BNB", true),
];

/// Returns the table entry for a chain id, or `None` for unlisted chains.
pub fn get_network(chain_id: u64) -> Option<&'static KnownNetwork> {
    KNOWN_NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

pub fn known_networks() -> &'static [KnownNetwork] {
    KNOWN_NETWORKS
}

/// Human-readable name of a chain: the table name, or `Chain <id>`.
pub fn network_display_name(chain_id: u64) -> String {
    match get_network(chain_id) {
        Some(network) => network.name.to_string(),
        None => format!("Chain {chain_id}"),
    }
}
