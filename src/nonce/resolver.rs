//! Next-nonce resolution
//!
//! The indexer is often slow to reflect freshly broadcast transactions, both
//! in `possible_next_nonce` and in `detected_missing_nonces`. The resolver
//! reconciles its view with the pending transactions the wallet already
//! knows about.

use crate::api::{AccountNonces, PendingTransaction};

/// Nonce for the next outgoing transaction.
///
/// `pending` is the account's mempool view; its order does not matter.
/// Returns 0 when there is no account info. Without missing nonces the result
/// is never a nonce some pending transaction already uses.
pub fn resolve_next_nonce(info: Option<&AccountNonces>, pending: &[PendingTransaction]) -> u64 {
    let Some(info) = info else {
        return 0;
    };

    let missing = &info.detected_missing_nonces;
    let possible_next = info.possible_next_nonce;
    let highest_pending = pending.iter().map(|tx| tx.nonce).max();

    match (missing.is_empty(), highest_pending) {
        // Missing nonces may already be filled by transactions we broadcast
        (false, Some(highest)) => missing
            .iter()
            .copied()
            .filter(|nonce| !pending.iter().any(|tx| tx.nonce == *nonce))
            .min()
            .unwrap_or_else(|| highest.saturating_add(1).max(possible_next)),
        (false, None) => missing.iter().copied().min().unwrap_or(possible_next),
        // The indexer has not seen our latest broadcasts yet
        (true, _) => first_free_from(possible_next, pending),
    }
}

/// Smallest nonce at or above `start` that no pending transaction uses
fn first_free_from(start: u64, pending: &[PendingTransaction]) -> u64 {
    let mut nonce = start;
    while nonce < u64::MAX && pending.iter().any(|tx| tx.nonce == nonce) {
        nonce += 1;
    }
    nonce
}
