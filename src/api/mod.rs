//! Remote services the wallet core reads from
//!
//! The core only sees these traits. `IndexerClient` talks to the HTTP
//! indexer API, `RpcClient` to a node's JSON-RPC endpoint.

mod indexer;
mod rpc;

pub use indexer::IndexerClient;
pub use rpc::RpcClient;

use crate::Result;
use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transaction identifier (transaction hash)
pub type TxId = B256;

/// Server-reported nonce state for an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountNonces {
    /// Nonces below the next nonce that the server has not seen
    #[serde(default)]
    pub detected_missing_nonces: Vec<u64>,
    /// The server's guess at the next nonce
    pub possible_next_nonce: u64,
    #[serde(default)]
    pub last_executed_tx_nonce: Option<u64>,
    #[serde(default)]
    pub last_mempool_tx_nonce: Option<u64>,
}

/// A broadcast, unconfirmed transaction sent by the tracked account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub tx_id: TxId,
    pub nonce: u64,
    pub sender: Address,
    /// When the mempool first saw the transaction
    pub observed_at: DateTime<Utc>,
}

/// Account nonce service
#[async_trait]
pub trait NonceApi: Send + Sync {
    /// Nonce info for `address`, `None` if the service knows nothing about it
    async fn account_nonces(&self, address: Address) -> Result<Option<AccountNonces>>;
}

/// Mempool query
#[async_trait]
pub trait MempoolApi: Send + Sync {
    /// Pending transactions sent by `address`, newest first
    async fn pending_transactions(&self, address: Address) -> Result<Vec<PendingTransaction>>;
}

/// Raw transaction lookup
#[async_trait]
pub trait RawTxApi: Send + Sync {
    /// EIP-2718 encoded bytes of transaction `id`
    async fn raw_transaction(&self, id: TxId) -> Result<Bytes>;
}

#[async_trait]
impl<T: NonceApi + ?Sized> NonceApi for std::sync::Arc<T> {
    async fn account_nonces(&self, address: Address) -> Result<Option<AccountNonces>> {
        (**self).account_nonces(address).await
    }
}

#[async_trait]
impl<T: MempoolApi + ?Sized> MempoolApi for std::sync::Arc<T> {
    async fn pending_transactions(&self, address: Address) -> Result<Vec<PendingTransaction>> {
        (**self).pending_transactions(address).await
    }
}

#[async_trait]
impl<T: RawTxApi + ?Sized> RawTxApi for std::sync::Arc<T> {
    async fn raw_transaction(&self, id: TxId) -> Result<Bytes> {
        (**self).raw_transaction(id).await
    }
}

/// Parse a `0x`-prefixed (or bare) 32-byte hex transaction id
pub fn parse_tx_id(raw: &str) -> Result<TxId> {
    let trimmed = raw.trim();
    let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    format!("0x{}", hex)
        .parse()
        .map_err(|e| crate::Error::InvalidArgument(format!("Invalid transaction id {}: {}", raw, e)))
}
