//! Current account nonce state
//!
//! `NonceTracker` is the only writer of the account's current nonce. Readers
//! get the value through `next_nonce` or a subscription.

use super::resolve_next_nonce;
use crate::api::{MempoolApi, NonceApi, PendingTransaction};
use crate::state::{CellReceiver, StateCell};
use crate::Result;
use alloy::primitives::Address;

/// Why a refresh was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Mount,
    Reconnect,
    Focus,
    Interval,
    Manual,
}

/// Tracks the next nonce for one account
pub struct NonceTracker<N, M> {
    address: Address,
    nonce_api: N,
    mempool_api: M,
    current: StateCell<u64>,
}

impl<N: NonceApi, M: MempoolApi> NonceTracker<N, M> {
    pub fn new(address: Address, nonce_api: N, mempool_api: M) -> Self {
        Self {
            address,
            nonce_api,
            mempool_api,
            current: StateCell::new(0),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Last resolved nonce, 0 before the first successful refresh
    pub fn next_nonce(&self) -> u64 {
        self.current.get()
    }

    pub fn subscribe(&self) -> CellReceiver<u64> {
        self.current.subscribe()
    }

    /// Fetch account nonce info and pending transactions, then resolve.
    ///
    /// A non-zero result replaces the current nonce. Fetch errors leave the
    /// current nonce untouched.
    pub async fn refresh(&self, trigger: RefreshTrigger) -> Result<u64> {
        let (info, pending) = futures::try_join!(
            self.nonce_api.account_nonces(self.address),
            self.mempool_api.pending_transactions(self.address),
        )?;

        let pending = own_pending(self.address, pending);
        let next = resolve_next_nonce(info.as_ref(), &pending);

        tracing::debug!(
            address = %self.address,
            ?trigger,
            has_info = info.is_some(),
            pending = pending.len(),
            next,
            "Resolved next nonce"
        );

        if next != 0 {
            self.current.set(next);
        }
        Ok(next)
    }
}

/// Pending transactions sent by `address`, newest first
fn own_pending(address: Address, mut pending: Vec<PendingTransaction>) -> Vec<PendingTransaction> {
    pending.retain(|tx| tx.sender == address);
    pending.sort_by(|a, b| b.observed_at.cmp(&a.observed_at));
    pending
}
