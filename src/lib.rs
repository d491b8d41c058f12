//! Wallet core
//!
//! Account and transaction state for an EVM wallet:
//! - Resolve the next safe nonce from indexer nonce info and the mempool
//! - Keep that nonce fresh in the background
//! - Fetch a broadcast transaction, decode it, and re-sign it with a new fee
//!
//! # Security Model
//!
//! - Private keys never leave the `wallet` module
//! - API keys are held as `SecretString` and redacted from debug output

pub mod api;
pub mod config;
pub mod nonce;
pub mod state;
pub mod transactions;
pub mod validation;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use api::{AccountNonces, PendingTransaction, TxId};
pub use config::{Config, Endpoints, Network};
pub use error::{Error, Result};
pub use nonce::{resolve_next_nonce, NoncePoller, NonceTracker, RefreshTrigger};
pub use transactions::{RawTxCache, SignedTx, TxPipeline};
