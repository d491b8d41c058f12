//! Derived transaction state
//!
//! Given a selected transaction id, a fee override and the key store, the
//! pipeline derives the raw bytes, the decoded transaction, the re-signed
//! transaction and the raw byte length. Each derived value is computed on
//! demand and memoized against the versions of the inputs it read. A result
//! whose inputs changed while it was being computed is thrown away and
//! recomputed, so callers never see a value built from a mix of old and new
//! inputs.

use super::{decode_raw_tx, sign_transaction, DecodedTx, RawTxCache, SignedTx};
use crate::api::{RawTxApi, TxId};
use crate::state::{Memo, StateCell};
use crate::wallet::KeyStore;
use crate::Result;
use alloy::primitives::Bytes;
use std::sync::Arc;
use tracing::trace;

/// Input versions a signed transaction depends on
type SignedKey = (u64, u64, u64);

pub struct TxPipeline<A> {
    raw_tx_id: StateCell<Option<TxId>>,
    fee: StateCell<Option<u128>>,
    keys: Arc<KeyStore>,
    cache: Arc<RawTxCache<A>>,
    decoded: Memo<u64, Option<DecodedTx>>,
    signed: Memo<SignedKey, Option<SignedTx>>,
}

impl<A: RawTxApi> TxPipeline<A> {
    pub fn new(cache: Arc<RawTxCache<A>>, keys: Arc<KeyStore>) -> Self {
        Self {
            raw_tx_id: StateCell::new(None),
            fee: StateCell::new(None),
            keys,
            cache,
            decoded: Memo::new(),
            signed: Memo::new(),
        }
    }

    /// Select the transaction to derive from, or clear the selection
    pub fn set_raw_tx_id(&self, id: Option<TxId>) {
        self.raw_tx_id.set(id);
    }

    pub fn raw_tx_id(&self) -> Option<TxId> {
        self.raw_tx_id.get()
    }

    /// Fee per gas to sign with. `None` or zero keeps the transaction's own fee.
    pub fn set_fee(&self, fee_per_gas: Option<u128>) {
        self.fee.set(fee_per_gas);
    }

    pub fn fee(&self) -> Option<u128> {
        self.fee.get()
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// Raw bytes of the selected transaction
    pub async fn raw_tx(&self) -> Result<Option<Bytes>> {
        match self.raw_tx_id.get() {
            Some(id) => Ok(Some(self.cache.get_or_fetch(id).await?)),
            None => Ok(None),
        }
    }

    /// The selected transaction, decoded
    pub async fn deserialized(&self) -> Result<Option<DecodedTx>> {
        loop {
            let version = self.raw_tx_id.version();
            if let Some(hit) = self.decoded.lookup(&version).await {
                return Ok(hit);
            }

            let decoded = match self.raw_tx().await? {
                Some(bytes) => Some(decode_raw_tx(&bytes)?),
                None => None,
            };

            if self.raw_tx_id.version() != version {
                trace!("Transaction id changed during decode, retrying");
                continue;
            }

            self.decoded.store(version, decoded.clone()).await;
            return Ok(decoded);
        }
    }

    /// The selected transaction re-signed with the active key and fee.
    ///
    /// `None` while no transaction is selected or the key store is locked.
    pub async fn signed(&self) -> Result<Option<SignedTx>> {
        loop {
            let key = self.signed_key();
            if let Some(hit) = self.signed.lookup(&key).await {
                return Ok(hit);
            }

            let decoded = self.deserialized().await?;
            let wallet = self.keys.active();
            let fee = self.fee.get();

            let signed = match (decoded, wallet) {
                (Some(decoded), Some(wallet)) => Some(sign_transaction(decoded.tx, &wallet, fee)?),
                _ => None,
            };

            if self.signed_key() != key {
                trace!("Signing inputs changed, retrying");
                continue;
            }

            self.signed.store(key, signed.clone()).await;
            return Ok(signed);
        }
    }

    /// Size of the selected raw transaction, 0 when nothing is selected
    pub async fn byte_length(&self) -> Result<usize> {
        Ok(self
            .deserialized()
            .await?
            .map(|decoded| decoded.encoded_len())
            .unwrap_or(0))
    }

    fn signed_key(&self) -> SignedKey {
        (
            self.raw_tx_id.version(),
            self.fee.version(),
            self.keys.version(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transactions::raw::tests::CountingRawApi;
    use crate::transactions::test_support::{eip1559_tx, legacy_tx, signed_raw, test_wallet};
    use crate::transactions::UnsignedTx;
    use crate::wallet::SecureWallet;
    use crate::Error;
    use alloy::primitives::B256;

    struct Fixture {
        api: Arc<CountingRawApi>,
        pipeline: TxPipeline<Arc<CountingRawApi>>,
        legacy_id: TxId,
        eip1559_id: TxId,
    }

    /// Two transactions sent by the devnet account and a fresh key to unlock
    fn fixture() -> (Fixture, SecureWallet) {
        let sender = test_wallet();
        let legacy_id = B256::repeat_byte(0x11);
        let eip1559_id = B256::repeat_byte(0x22);

        let api = Arc::new(CountingRawApi::with([
            (legacy_id, signed_raw(&sender, UnsignedTx::Legacy(legacy_tx(5)))),
            (eip1559_id, signed_raw(&sender, UnsignedTx::Eip1559(eip1559_tx(6)))),
        ]));
        let cache = Arc::new(RawTxCache::new(api.clone(), None));

        let (wallet, _) = SecureWallet::generate();
        let keys = Arc::new(KeyStore::new());
        let pipeline = TxPipeline::new(cache, keys);

        (
            Fixture {
                api,
                pipeline,
                legacy_id,
                eip1559_id,
            },
            wallet,
        )
    }

    #[tokio::test]
    async fn nothing_selected() {
        let (f, _) = fixture();
        assert_eq!(f.pipeline.raw_tx().await.unwrap(), None);
        assert_eq!(f.pipeline.deserialized().await.unwrap(), None);
        assert_eq!(f.pipeline.signed().await.unwrap(), None);
        assert_eq!(f.pipeline.byte_length().await.unwrap(), 0);
        assert_eq!(f.api.calls(), 0);
    }

    #[tokio::test]
    async fn signs_with_fee_override_and_active_key() {
        let (f, wallet) = fixture();
        let address = wallet.address();
        f.pipeline.keys().set_active(wallet);

        f.pipeline.set_raw_tx_id(Some(f.eip1559_id));
        f.pipeline.set_fee(Some(12_345));

        let signed = f.pipeline.signed().await.unwrap().unwrap();
        assert_eq!(signed.fee_per_gas(), 12_345);
        assert_eq!(signed.nonce(), 6);
        assert_eq!(signed.recover_signer().unwrap(), address);
    }

    #[tokio::test]
    async fn locked_key_store_yields_none() {
        let (f, _) = fixture();
        f.pipeline.set_raw_tx_id(Some(f.legacy_id));
        f.pipeline.set_fee(Some(1));

        assert!(f.pipeline.deserialized().await.unwrap().is_some());
        assert_eq!(f.pipeline.signed().await.unwrap(), None);
    }

    #[tokio::test]
    async fn raw_bytes_fetched_once() {
        let (f, wallet) = fixture();
        f.pipeline.keys().set_active(wallet);
        f.pipeline.set_raw_tx_id(Some(f.legacy_id));

        let raw = f.pipeline.raw_tx().await.unwrap().unwrap();
        let decoded = f.pipeline.deserialized().await.unwrap().unwrap();
        assert_eq!(f.pipeline.byte_length().await.unwrap(), raw.len());
        assert_eq!(decoded.sender, test_wallet().address());

        f.pipeline.set_fee(Some(7));
        f.pipeline.signed().await.unwrap().unwrap();
        f.pipeline.set_fee(Some(8));
        f.pipeline.signed().await.unwrap().unwrap();

        // reselecting the same id reuses the cached bytes
        f.pipeline.set_raw_tx_id(Some(f.legacy_id));
        f.pipeline.signed().await.unwrap().unwrap();

        assert_eq!(f.api.calls(), 1);
    }

    #[tokio::test]
    async fn recomputes_when_inputs_change() {
        let (f, wallet) = fixture();
        f.pipeline.keys().set_active(wallet);
        f.pipeline.set_raw_tx_id(Some(f.legacy_id));
        f.pipeline.set_fee(Some(100));

        let first = f.pipeline.signed().await.unwrap().unwrap();
        assert_eq!(f.pipeline.signed().await.unwrap().unwrap(), first);

        f.pipeline.set_fee(Some(200));
        let repriced = f.pipeline.signed().await.unwrap().unwrap();
        assert_eq!(repriced.fee_per_gas(), 200);
        assert_ne!(repriced.tx_hash(), first.tx_hash());

        f.pipeline.set_raw_tx_id(Some(f.eip1559_id));
        let switched = f.pipeline.signed().await.unwrap().unwrap();
        assert_eq!(switched.nonce(), 6);

        f.pipeline.keys().lock();
        assert_eq!(f.pipeline.signed().await.unwrap(), None);
    }

    #[tokio::test]
    async fn fee_none_keeps_original_fee() {
        let (f, wallet) = fixture();
        f.pipeline.keys().set_active(wallet);
        f.pipeline.set_raw_tx_id(Some(f.legacy_id));

        let signed = f.pipeline.signed().await.unwrap().unwrap();
        assert_eq!(signed.fee_per_gas(), 1_000_000_000);
    }

    #[tokio::test]
    async fn unknown_id_is_an_error() {
        let (f, _) = fixture();
        f.pipeline.set_raw_tx_id(Some(B256::repeat_byte(0x99)));

        assert!(matches!(f.pipeline.deserialized().await, Err(Error::NotFound(_))));
        assert!(matches!(f.pipeline.signed().await, Err(Error::NotFound(_))));
    }
}
