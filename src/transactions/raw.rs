//! Raw transaction byte cache
//!
//! Raw bytes of a transaction never change, so entries are kept until evicted.
//! Concurrent requests for the same id share one fetch.

use crate::api::{RawTxApi, TxId};
use crate::Result;
use alloy::primitives::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::debug;

#[derive(Default)]
struct Entries {
    cells: HashMap<TxId, Arc<OnceCell<Bytes>>>,
    // insertion order, oldest first
    order: VecDeque<TxId>,
}

impl Entries {
    fn slot(&mut self, id: TxId, capacity: Option<usize>) -> Arc<OnceCell<Bytes>> {
        if let Some(cell) = self.cells.get(&id) {
            return cell.clone();
        }

        if let Some(capacity) = capacity {
            while self.cells.len() >= capacity.max(1) {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.cells.remove(&oldest);
                debug!(tx_id = %oldest, "Evicted raw transaction");
            }
        }

        let cell = Arc::new(OnceCell::new());
        self.cells.insert(id, cell.clone());
        self.order.push_back(id);
        cell
    }

    fn remove(&mut self, id: &TxId) -> bool {
        self.order.retain(|entry| entry != id);
        self.cells.remove(id).is_some()
    }
}

/// Cache of raw transaction bytes by transaction id
pub struct RawTxCache<A> {
    api: A,
    capacity: Option<usize>,
    entries: RwLock<Entries>,
}

impl<A: RawTxApi> RawTxCache<A> {
    /// `capacity` of `None` keeps every entry
    pub fn new(api: A, capacity: Option<usize>) -> Self {
        Self {
            api,
            capacity,
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Cached bytes for `id`, fetching them on first use.
    ///
    /// A failed fetch is not cached; the next call retries.
    pub async fn get_or_fetch(&self, id: TxId) -> Result<Bytes> {
        let existing = self.entries.read().await.cells.get(&id).cloned();
        let cell = match existing {
            Some(cell) => cell,
            None => self.entries.write().await.slot(id, self.capacity),
        };

        let bytes = cell
            .get_or_try_init(|| async {
                debug!(tx_id = %id, "Fetching raw transaction");
                self.api.raw_transaction(id).await
            })
            .await?;

        Ok(bytes.clone())
    }

    /// Cached bytes without fetching
    pub async fn peek(&self, id: &TxId) -> Option<Bytes> {
        let entries = self.entries.read().await;
        entries.cells.get(id).and_then(|cell| cell.get().cloned())
    }

    /// Drop one entry. Returns whether it was present.
    pub async fn evict(&self, id: &TxId) -> bool {
        self.entries.write().await.remove(id)
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.cells.clear();
        entries.order.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.cells.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Error;
    use alloy::primitives::B256;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Serves fixed bytes for known ids and counts every call
    #[derive(Default)]
    pub(crate) struct CountingRawApi {
        pub txs: HashMap<TxId, Bytes>,
        pub calls: AtomicUsize,
        pub delay: Option<Duration>,
    }

    impl CountingRawApi {
        pub fn with(txs: impl IntoIterator<Item = (TxId, Bytes)>) -> Self {
            Self {
                txs: txs.into_iter().collect(),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RawTxApi for CountingRawApi {
        async fn raw_transaction(&self, id: TxId) -> crate::Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.txs
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
        }
    }

    fn id(byte: u8) -> TxId {
        B256::repeat_byte(byte)
    }

    fn api() -> Arc<CountingRawApi> {
        Arc::new(CountingRawApi::with([
            (id(1), Bytes::from_static(&[0x01])),
            (id(2), Bytes::from_static(&[0x02])),
            (id(3), Bytes::from_static(&[0x03])),
        ]))
    }

    #[tokio::test]
    async fn fetches_once_per_id() {
        let api = api();
        let cache = RawTxCache::new(api.clone(), None);

        assert_eq!(cache.get_or_fetch(id(1)).await.unwrap(), Bytes::from_static(&[0x01]));
        assert_eq!(cache.get_or_fetch(id(1)).await.unwrap(), Bytes::from_static(&[0x01]));
        assert_eq!(api.calls(), 1);

        cache.get_or_fetch(id(2)).await.unwrap();
        assert_eq!(api.calls(), 2);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn concurrent_requests_share_fetch() {
        let api = Arc::new(CountingRawApi {
            delay: Some(Duration::from_millis(20)),
            ..CountingRawApi::with([(id(1), Bytes::from_static(&[0xaa]))])
        });
        let cache = RawTxCache::new(api.clone(), None);

        let (a, b) = futures::join!(cache.get_or_fetch(id(1)), cache.get_or_fetch(id(1)));
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_retried() {
        let api = api();
        let cache = RawTxCache::new(api.clone(), None);

        assert!(matches!(cache.get_or_fetch(id(9)).await, Err(Error::NotFound(_))));
        assert!(cache.get_or_fetch(id(9)).await.is_err());
        assert_eq!(api.calls(), 2);
        assert_eq!(cache.peek(&id(9)).await, None);
    }

    #[tokio::test]
    async fn capacity_evicts_oldest() {
        let api = api();
        let cache = RawTxCache::new(api.clone(), Some(2));

        cache.get_or_fetch(id(1)).await.unwrap();
        cache.get_or_fetch(id(2)).await.unwrap();
        cache.get_or_fetch(id(3)).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.peek(&id(1)).await, None);
        assert!(cache.peek(&id(3)).await.is_some());

        cache.get_or_fetch(id(1)).await.unwrap();
        assert_eq!(api.calls(), 4);
    }

    #[tokio::test]
    async fn evict_and_clear() {
        let api = api();
        let cache = RawTxCache::new(api.clone(), None);

        cache.get_or_fetch(id(1)).await.unwrap();
        cache.get_or_fetch(id(2)).await.unwrap();

        assert!(cache.evict(&id(1)).await);
        assert!(!cache.evict(&id(1)).await);
        cache.get_or_fetch(id(1)).await.unwrap();
        assert_eq!(api.calls(), 3);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
