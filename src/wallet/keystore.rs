//! Active account key store
//!
//! Holds the wallet of the currently selected account while the extension is
//! unlocked. A locked store has no active key; signing reads treat that as
//! "not ready" rather than an error.

use super::SecureWallet;
use crate::state::StateCell;
use alloy::primitives::Address;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct KeyStore {
    active: StateCell<Option<Arc<SecureWallet>>>,
}

impl KeyStore {
    /// An empty (locked) key store
    pub fn new() -> Self {
        Self::default()
    }

    /// A key store unlocked with `wallet`
    pub fn unlocked(wallet: SecureWallet) -> Self {
        let store = Self::new();
        store.set_active(wallet);
        store
    }

    /// Make `wallet` the active account
    pub fn set_active(&self, wallet: SecureWallet) {
        tracing::debug!(address = %wallet.address(), "Active account changed");
        self.active.set(Some(Arc::new(wallet)));
    }

    /// Drop the active key
    pub fn lock(&self) {
        self.active.set(None);
    }

    /// The active wallet, if unlocked
    pub fn active(&self) -> Option<Arc<SecureWallet>> {
        self.active.get()
    }

    pub fn active_address(&self) -> Option<Address> {
        self.active.get().map(|wallet| wallet.address())
    }

    /// Changes whenever the active key changes
    pub fn version(&self) -> u64 {
        self.active.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_by_default() {
        let store = KeyStore::new();
        assert!(store.active().is_none());
        assert_eq!(store.active_address(), None);
    }

    #[test]
    fn unlock_and_lock_bump_version() {
        let (wallet, _secret) = SecureWallet::generate();
        let address = wallet.address();

        let store = KeyStore::new();
        let v0 = store.version();

        store.set_active(wallet);
        assert_eq!(store.active_address(), Some(address));
        assert!(store.version() > v0);

        let v1 = store.version();
        store.lock();
        assert!(store.active().is_none());
        assert!(store.version() > v1);
    }
}
