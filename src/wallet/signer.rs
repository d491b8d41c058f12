//! Secure wallet implementation
//!
//! SECURITY: private keys live only inside `PrivateKeySigner`.
//! - Keys are never serialized
//! - Keys are never logged
//! - A freshly generated key is exported exactly once, as a `SecretString`

use crate::{Error, Result};
use alloy::hex;
use alloy::primitives::{Address, Signature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use secrecy::SecretString;

/// Wallet for a single account
pub struct SecureWallet {
    signer: PrivateKeySigner,
    address: Address,
}

impl SecureWallet {
    /// Create a wallet from an environment variable holding a hex private key
    pub fn from_env(var_name: &str) -> Result<Self> {
        let key_hex = std::env::var(var_name).map_err(|_| {
            Error::Wallet(format!(
                "Environment variable {} not set. Required for wallet initialization.",
                var_name
            ))
        })?;

        Self::from_hex(&key_hex)
    }

    /// Create a wallet from a hex-encoded private key
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        let key_hex = key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Wallet(format!("Invalid private key: {}", e)))?;

        Ok(Self::from_signer(signer))
    }

    /// Generate a new secret key.
    ///
    /// Returns the wallet and the hex key for the user to back up.
    pub fn generate() -> (Self, SecretString) {
        let signer = PrivateKeySigner::random();
        let secret = SecretString::from(format!("0x{}", hex::encode(signer.to_bytes())));
        (Self::from_signer(signer), secret)
    }

    fn from_signer(signer: PrivateKeySigner) -> Self {
        let address = signer.address();
        Self { signer, address }
    }

    /// Public address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    /// Address as a checksummed string
    pub fn address_string(&self) -> String {
        self.address.to_checksum(None)
    }

    /// Sign a 32-byte prehash
    pub fn sign_hash(&self, hash: &B256) -> Result<Signature> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| Error::Signing(e.to_string()))
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for SecureWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureWallet")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}
