//! Secure wallet management
//!
//! This module handles private key storage and signing. Private keys never
//! leave it.

mod keystore;
mod signer;

pub use keystore::KeyStore;
pub use signer::SecureWallet;
