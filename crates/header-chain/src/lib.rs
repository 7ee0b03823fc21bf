//! Tracks the source chain's header history on the destination chain.
//!
//! Headers enter a hash-keyed buffer as soon as they are seen and are promoted to the
//! height-keyed finalized index once they sit a fixed number of confirmations deep. The buffer
//! keeps every header ever observed, forks included, so that ancestry can always be walked by
//! parent-hash lookups.

pub mod errors;
pub mod keys;
mod store;

pub use errors::HeaderChainError;
pub use store::{ChainUpdate, HeaderChainStore};
