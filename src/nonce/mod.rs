//! Account nonce management
//!
//! - [`resolve_next_nonce`]: pure reconciliation of server nonce state with
//!   locally pending transactions
//! - [`NonceTracker`]: owns the account's current nonce
//! - [`NoncePoller`]: keeps the tracker fresh in the background

mod poller;
mod resolver;
mod tracker;

pub use poller::NoncePoller;
pub use resolver::resolve_next_nonce;
pub use tracker::{NonceTracker, RefreshTrigger};
