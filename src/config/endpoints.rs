//! Remote endpoint configuration
//!
//! Resolution order, per endpoint:
//! 1. Explicit URL in the config file
//! 2. Environment variable (WALLET_API_URL, WALLET_RPC_URL)
//! 3. Network default (public node RPC, local devnet indexer)
//!
//! The indexer API key is only ever read from WALLET_API_KEY.
//!
//! ```bash
//! export WALLET_API_URL="https://indexer.example.org"
//! export WALLET_RPC_URL="https://eth-sepolia.g.alchemy.com/v2/YOUR_KEY"
//! export WALLET_API_KEY="YOUR_KEY"
//! ```

use super::{Config, Network};
use crate::{Error, Result};
use secrecy::SecretString;

/// Environment variable names
pub mod env_vars {
    pub const API_URL: &str = "WALLET_API_URL";
    pub const RPC_URL: &str = "WALLET_RPC_URL";
    pub const API_KEY: &str = "WALLET_API_KEY";
}

/// Public or local fallbacks
mod defaults {
    pub const MAINNET_RPC: &str = "https://eth.llamarpc.com";
    pub const SEPOLIA_RPC: &str = "https://ethereum-sepolia-rpc.publicnode.com";
    pub const LOCALHOST_RPC: &str = "http://localhost:8545";
    pub const LOCALHOST_API: &str = "http://localhost:3999";
}

/// Resolved remote endpoints
pub struct Endpoints {
    /// Indexer API base URL (nonces, mempool, raw transactions)
    pub api_url: Option<url::Url>,
    /// Node JSON-RPC URL
    pub rpc_url: url::Url,
    /// Indexer API key, sent as `x-api-key`
    pub api_key: Option<SecretString>,
}

impl Endpoints {
    /// Resolve endpoints from config, environment and network defaults
    pub fn resolve(config: &Config) -> Result<Self> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    fn resolve_with(config: &Config, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = match config.api_url.clone().or_else(|| env(env_vars::API_URL)) {
            Some(url) => Some(url),
            None if config.network == Network::Localhost => Some(defaults::LOCALHOST_API.to_string()),
            None => {
                tracing::warn!(
                    network = config.network.name(),
                    "No indexer API configured; set {} to enable nonce and mempool queries",
                    env_vars::API_URL
                );
                None
            }
        };

        let rpc_url = config
            .rpc_url
            .clone()
            .or_else(|| env(env_vars::RPC_URL))
            .unwrap_or_else(|| {
                let fallback = match config.network {
                    Network::Mainnet => defaults::MAINNET_RPC,
                    Network::Sepolia => defaults::SEPOLIA_RPC,
                    Network::Localhost => defaults::LOCALHOST_RPC,
                };
                tracing::debug!(network = config.network.name(), url = fallback, "Using default RPC");
                fallback.to_string()
            });

        let api_key = env(env_vars::API_KEY)
            .filter(|key| !key.is_empty())
            .map(SecretString::from);

        Ok(Self {
            api_url: api_url.map(|url| parse_url(&url)).transpose()?,
            rpc_url: parse_url(&rpc_url)?,
            api_key,
        })
    }
}

fn parse_url(raw: &str) -> Result<url::Url> {
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid URL {}: {}", raw, e)))
}

impl std::fmt::Debug for Endpoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoints")
            .field("api_url", &self.api_url.as_ref().map(|u| u.as_str()))
            .field("rpc_url", &self.rpc_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn localhost_defaults() {
        let endpoints = Endpoints::resolve_with(&Config::default(), env_from(&[])).unwrap();
        assert_eq!(endpoints.api_url.unwrap().as_str(), "http://localhost:3999/");
        assert_eq!(endpoints.rpc_url.as_str(), "http://localhost:8545/");
        assert!(endpoints.api_key.is_none());
    }

    #[test]
    fn mainnet_has_no_default_indexer() {
        let config = Config {
            network: Network::Mainnet,
            ..Config::default()
        };
        let endpoints = Endpoints::resolve_with(&config, env_from(&[])).unwrap();
        assert!(endpoints.api_url.is_none());
        assert_eq!(endpoints.rpc_url.as_str(), "https://eth.llamarpc.com/");
    }

    #[test]
    fn config_beats_env() {
        let config = Config {
            api_url: Some("http://from-config:1".to_string()),
            ..Config::default()
        };
        let env = env_from(&[
            (env_vars::API_URL, "http://from-env:2"),
            (env_vars::RPC_URL, "http://rpc-env:3"),
            (env_vars::API_KEY, "secret-key"),
        ]);
        let endpoints = Endpoints::resolve_with(&config, env).unwrap();
        assert_eq!(endpoints.api_url.unwrap().as_str(), "http://from-config:1/");
        assert_eq!(endpoints.rpc_url.as_str(), "http://rpc-env:3/");
        assert_eq!(endpoints.api_key.unwrap().expose_secret(), "secret-key");
    }

    #[test]
    fn invalid_url_is_config_error() {
        let config = Config {
            rpc_url: Some("not a url".to_string()),
            ..Config::default()
        };
        let err = Endpoints::resolve_with(&config, env_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let env = env_from(&[(env_vars::API_KEY, "super-secret")]);
        let endpoints = Endpoints::resolve_with(&Config::default(), env).unwrap();
        let debug = format!("{:?}", endpoints);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
