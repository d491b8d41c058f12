//! Application state primitives
//!
//! Replaces ambient globals with owned cells. Inputs live in [`StateCell`]s;
//! derived values are cached in a [`Memo`] keyed by the versions of the cells
//! they read, so a changed input forces recomputation on the next read.

mod cell;
mod memo;

pub use cell::{CellReceiver, StateCell};
pub use memo::Memo;
