//! Re-signing decoded transactions with the active key

use super::UnsignedTx;
use crate::wallet::SecureWallet;
use crate::{Error, Result};
use alloy::consensus::{SignableTransaction, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::hex;
use alloy::primitives::{Address, Bytes, Signature, B256};

/// A transaction signed by the local wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    envelope: TxEnvelope,
    signature: Signature,
    signature_hash: B256,
    nonce: u64,
    fee_per_gas: u128,
}

impl SignedTx {
    pub fn envelope(&self) -> &TxEnvelope {
        &self.envelope
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Fee per gas the signature commits to
    pub fn fee_per_gas(&self) -> u128 {
        self.fee_per_gas
    }

    pub fn tx_hash(&self) -> B256 {
        *self.envelope.tx_hash()
    }

    /// EIP-2718 encoding, ready for `eth_sendRawTransaction`
    pub fn encoded(&self) -> Bytes {
        self.envelope.encoded_2718().into()
    }

    pub fn encoded_hex(&self) -> String {
        hex::encode_prefixed(self.encoded())
    }

    /// Recover the address that produced the signature
    pub fn recover_signer(&self) -> Result<Address> {
        self.signature
            .recover_address_from_prehash(&self.signature_hash)
            .map_err(|e| Error::Signing(format!("unable to recover signer: {}", e)))
    }
}

/// Sign `tx` with `wallet`, optionally overriding its fee per gas first.
///
/// A zero fee counts as no override.
pub fn sign_transaction(
    mut tx: UnsignedTx,
    wallet: &SecureWallet,
    fee_per_gas: Option<u128>,
) -> Result<SignedTx> {
    if let Some(fee) = fee_per_gas.filter(|fee| *fee > 0) {
        tx.set_fee(fee);
    }

    let signature_hash = tx.signature_hash();
    let signature = wallet.sign_hash(&signature_hash)?;
    let nonce = tx.nonce();
    let fee_per_gas = tx.fee_per_gas();

    let envelope: TxEnvelope = match tx {
        UnsignedTx::Legacy(inner) => inner.into_signed(signature).into(),
        UnsignedTx::Eip2930(inner) => inner.into_signed(signature).into(),
        UnsignedTx::Eip1559(inner) => inner.into_signed(signature).into(),
    };

    tracing::debug!(
        signer = %wallet.address(),
        nonce,
        fee_per_gas,
        tx_hash = %envelope.tx_hash(),
        "Signed transaction"
    );

    Ok(SignedTx {
        envelope,
        signature,
        signature_hash,
        nonce,
        fee_per_gas,
    })
}
