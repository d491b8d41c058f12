//! Node JSON-RPC backed nonce and raw transaction lookups
//!
//! A plain node cannot report gaps in an account's nonce sequence, so
//! `detected_missing_nonces` is always empty here. Use the indexer when gap
//! detection matters.

use super::{AccountNonces, NonceApi, RawTxApi, TxId};
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;

/// JSON-RPC client for a single chain
pub struct RpcClient {
    provider: DynProvider,
}

impl RpcClient {
    pub fn new(rpc_url: url::Url) -> Self {
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        Self { provider }
    }
}

#[async_trait]
impl NonceApi for RpcClient {
    async fn account_nonces(&self, address: Address) -> Result<Option<AccountNonces>> {
        let latest = self
            .provider
            .get_transaction_count(address)
            .latest()
            .await
            .map_err(|e| Error::Api(format!("eth_getTransactionCount failed: {}", e)))?;
        let pending = self
            .provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| Error::Api(format!("eth_getTransactionCount failed: {}", e)))?;

        tracing::debug!(%address, latest, pending, "Fetched transaction counts");

        Ok(Some(nonces_from_counts(latest, pending)))
    }
}

#[async_trait]
impl RawTxApi for RpcClient {
    async fn raw_transaction(&self, id: TxId) -> Result<Bytes> {
        self.provider
            .get_raw_transaction_by_hash(id)
            .await
            .map_err(|e| Error::Api(format!("eth_getRawTransactionByHash failed: {}", e)))?
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
    }
}

/// Map `latest`/`pending` transaction counts onto the indexer's nonce shape
fn nonces_from_counts(latest: u64, pending: u64) -> AccountNonces {
    let possible_next_nonce = latest.max(pending);
    AccountNonces {
        detected_missing_nonces: Vec::new(),
        possible_next_nonce,
        last_executed_tx_nonce: latest.checked_sub(1),
        last_mempool_tx_nonce: (pending > latest).then(|| pending - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_account() {
        let nonces = nonces_from_counts(0, 0);
        assert_eq!(nonces.possible_next_nonce, 0);
        assert_eq!(nonces.last_executed_tx_nonce, None);
        assert_eq!(nonces.last_mempool_tx_nonce, None);
    }

    #[test]
    fn pending_ahead_of_latest() {
        let nonces = nonces_from_counts(4, 6);
        assert_eq!(nonces.possible_next_nonce, 6);
        assert_eq!(nonces.last_executed_tx_nonce, Some(3));
        assert_eq!(nonces.last_mempool_tx_nonce, Some(5));
        assert!(nonces.detected_missing_nonces.is_empty());
    }
}
