//! Key-value storage backing the bridge state machine.
//!
//! Every backend implements [`KvStore`]: point reads plus atomic application of a
//! [`WriteBatch`]. [`CachedStore`] layers a write cache over any backend so that a transaction
//! handler can stage its writes and have them land all at once, or not at all.

pub mod cached;
pub mod errors;
pub mod inmemory;
pub mod persistent;
pub mod store;

pub use cached::CachedStore;
pub use errors::{DbError, DbResult};
pub use inmemory::MemStore;
pub use persistent::SledStore;
pub use store::{KvStore, KvStoreExt, WriteBatch};
