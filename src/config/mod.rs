//! Configuration for the wallet core

pub mod endpoints;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// Re-export endpoint config
pub use endpoints::Endpoints;

/// Supported networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Sepolia,
    #[default]
    Localhost,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => 1,
            Network::Sepolia => 11_155_111,
            Network::Localhost => 31_337,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Sepolia => "sepolia",
            Network::Localhost => "localhost",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "mainnet" | "ethereum" => Some(Network::Mainnet),
            "sepolia" | "testnet" => Some(Network::Sepolia),
            "localhost" | "local" | "devnet" => Some(Network::Localhost),
            _ => None,
        }
    }
}

/// When the account nonce is refetched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonceRefreshConfig {
    /// Refresh once when the poller starts
    pub refresh_on_mount: bool,
    /// Refresh when the network connection comes back
    pub refresh_on_reconnect: bool,
    /// Refresh when the wallet window regains focus
    pub refresh_on_focus: bool,
    /// Background polling interval (milliseconds), disabled when absent
    pub interval_ms: Option<u64>,
}

impl NonceRefreshConfig {
    pub fn interval(&self) -> Option<Duration> {
        self.interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

impl Default for NonceRefreshConfig {
    fn default() -> Self {
        Self {
            refresh_on_mount: true,
            refresh_on_reconnect: true,
            refresh_on_focus: true,
            interval_ms: Some(30_000),
        }
    }
}

/// Raw transaction cache sizing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTxCacheConfig {
    /// Maximum cached transactions; unbounded when absent
    pub capacity: Option<usize>,
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network the wallet talks to
    #[serde(default)]
    pub network: Network,
    /// Indexer API base URL (overrides env and network default)
    #[serde(default)]
    pub api_url: Option<String>,
    /// Node JSON-RPC URL (overrides env and network default)
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Account nonce refresh policy
    #[serde(default)]
    pub nonce_refresh: NonceRefreshConfig,
    /// Raw transaction cache settings
    #[serde(default)]
    pub raw_tx_cache: RawTxCacheConfig,
    /// HTTP request timeout (milliseconds)
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::default(),
            api_url: None,
            rpc_url: None,
            nonce_refresh: NonceRefreshConfig::default(),
            raw_tx_cache: RawTxCacheConfig::default(),
            request_timeout_ms: 10_000,
        }
    }
}
