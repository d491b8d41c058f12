//! Raw transaction decoding

use crate::{Error, Result};
use alloy::consensus::{SignableTransaction, Signed, TxEip1559, TxEip2930, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, Signature, B256};

/// Transaction body without a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsignedTx {
    Legacy(TxLegacy),
    Eip2930(TxEip2930),
    Eip1559(TxEip1559),
}

impl UnsignedTx {
    pub fn nonce(&self) -> u64 {
        match self {
            UnsignedTx::Legacy(tx) => tx.nonce,
            UnsignedTx::Eip2930(tx) => tx.nonce,
            UnsignedTx::Eip1559(tx) => tx.nonce,
        }
    }

    pub fn chain_id(&self) -> Option<u64> {
        match self {
            UnsignedTx::Legacy(tx) => tx.chain_id,
            UnsignedTx::Eip2930(tx) => Some(tx.chain_id),
            UnsignedTx::Eip1559(tx) => Some(tx.chain_id),
        }
    }

    pub fn gas_limit(&self) -> u64 {
        match self {
            UnsignedTx::Legacy(tx) => tx.gas_limit,
            UnsignedTx::Eip2930(tx) => tx.gas_limit,
            UnsignedTx::Eip1559(tx) => tx.gas_limit,
        }
    }

    /// Gas price, or the max fee per gas for EIP-1559
    pub fn fee_per_gas(&self) -> u128 {
        match self {
            UnsignedTx::Legacy(tx) => tx.gas_price,
            UnsignedTx::Eip2930(tx) => tx.gas_price,
            UnsignedTx::Eip1559(tx) => tx.max_fee_per_gas,
        }
    }

    /// Override the fee per gas.
    ///
    /// For EIP-1559 the priority fee is clamped so it never exceeds the max fee.
    pub fn set_fee(&mut self, fee_per_gas: u128) {
        match self {
            UnsignedTx::Legacy(tx) => tx.gas_price = fee_per_gas,
            UnsignedTx::Eip2930(tx) => tx.gas_price = fee_per_gas,
            UnsignedTx::Eip1559(tx) => {
                tx.max_fee_per_gas = fee_per_gas;
                tx.max_priority_fee_per_gas = tx.max_priority_fee_per_gas.min(fee_per_gas);
            }
        }
    }

    /// Hash the signer signs
    pub fn signature_hash(&self) -> B256 {
        match self {
            UnsignedTx::Legacy(tx) => tx.signature_hash(),
            UnsignedTx::Eip2930(tx) => tx.signature_hash(),
            UnsignedTx::Eip1559(tx) => tx.signature_hash(),
        }
    }
}

/// A raw transaction after decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTx {
    pub tx: UnsignedTx,
    /// Address recovered from the original signature
    pub sender: Address,
    /// Hash of the original transaction
    pub hash: B256,
    encoded_len: usize,
}

impl DecodedTx {
    /// Size of the raw transaction in bytes
    pub fn encoded_len(&self) -> usize {
        self.encoded_len
    }
}

/// Decode EIP-2718 bytes into a transaction ready to be re-signed
pub fn decode_raw_tx(bytes: &[u8]) -> Result<DecodedTx> {
    if bytes.is_empty() {
        return Err(Error::Decode("empty transaction bytes".to_string()));
    }

    let envelope =
        TxEnvelope::decode_2718_exact(bytes).map_err(|e| Error::Decode(e.to_string()))?;

    let (tx, sender, hash) = match envelope {
        TxEnvelope::Legacy(signed) => {
            let sender = recover(&signed)?;
            (UnsignedTx::Legacy(signed.tx().clone()), sender, *signed.hash())
        }
        TxEnvelope::Eip2930(signed) => {
            let sender = recover(&signed)?;
            (UnsignedTx::Eip2930(signed.tx().clone()), sender, *signed.hash())
        }
        TxEnvelope::Eip1559(signed) => {
            let sender = recover(&signed)?;
            (UnsignedTx::Eip1559(signed.tx().clone()), sender, *signed.hash())
        }
        other => {
            return Err(Error::Decode(format!(
                "unsupported transaction type {:?}",
                other.tx_type()
            )))
        }
    };

    Ok(DecodedTx {
        tx,
        sender,
        hash,
        encoded_len: bytes.len(),
    })
}

fn recover<T: SignableTransaction<Signature>>(signed: &Signed<T>) -> Result<Address> {
    signed
        .signature()
        .recover_address_from_prehash(&signed.tx().signature_hash())
        .map_err(|e| Error::Decode(format!("unable to recover signer: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transactions::test_support::{eip1559_tx, legacy_tx, signed_raw, test_wallet};

    #[test]
    fn decodes_eip1559() {
        let wallet = test_wallet();
        let raw = signed_raw(&wallet, UnsignedTx::Eip1559(eip1559_tx(4)));

        let decoded = decode_raw_tx(&raw).unwrap();
        assert_eq!(decoded.tx.nonce(), 4);
        assert_eq!(decoded.tx.chain_id(), Some(31_337));
        assert_eq!(decoded.sender, wallet.address());
        assert_eq!(decoded.encoded_len(), raw.len());
    }

    #[test]
    fn decodes_legacy() {
        let wallet = test_wallet();
        let raw = signed_raw(&wallet, UnsignedTx::Legacy(legacy_tx(9)));

        let decoded = decode_raw_tx(&raw).unwrap();
        assert!(matches!(decoded.tx, UnsignedTx::Legacy(_)));
        assert_eq!(decoded.tx.fee_per_gas(), 1_000_000_000);
        assert_eq!(decoded.sender, wallet.address());
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert!(matches!(decode_raw_tx(&[]), Err(Error::Decode(_))));
        assert!(matches!(decode_raw_tx(&[0x02, 0x01, 0x02]), Err(Error::Decode(_))));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let wallet = test_wallet();
        let mut raw = signed_raw(&wallet, UnsignedTx::Eip1559(eip1559_tx(1))).to_vec();
        raw.push(0x00);
        assert!(matches!(decode_raw_tx(&raw), Err(Error::Decode(_))));
    }

    #[test]
    fn set_fee_clamps_priority_fee() {
        let mut tx = UnsignedTx::Eip1559(eip1559_tx(0));
        tx.set_fee(1);
        match tx {
            UnsignedTx::Eip1559(inner) => {
                assert_eq!(inner.max_fee_per_gas, 1);
                assert_eq!(inner.max_priority_fee_per_gas, 1);
            }
            _ => unreachable!(),
        }
    }
}
