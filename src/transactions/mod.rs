//! Transaction derivation
//!
//! A selected transaction id flows through fetch, decode and re-sign:
//!
//! - [`RawTxCache`]: raw bytes by id, fetched at most once
//! - [`decode_raw_tx`]: EIP-2718 bytes to an [`UnsignedTx`]
//! - [`sign_transaction`]: fee override plus signature with the active key
//! - [`TxPipeline`]: memoized derived state over the above

mod decode;
mod pipeline;
mod raw;
mod sign;

pub use decode::{decode_raw_tx, DecodedTx, UnsignedTx};
pub use pipeline::TxPipeline;
pub use raw::RawTxCache;
pub use sign::{sign_transaction, SignedTx};
