//! Write-caching overlay used to make transaction handlers atomic.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use tracing::trace;

use crate::{
    errors::DbResult,
    store::{KvStore, WriteBatch},
};

/// Overlay that records writes in memory and reads through to `base` for everything else.
///
/// Nothing reaches `base` until [`CachedStore::commit`]; dropping the overlay discards the
/// staged writes.
#[derive(Debug)]
pub struct CachedStore<S> {
    base: S,
    staged: Mutex<BTreeMap<Vec<u8>, Option<Vec<u8>>>>,
}

impl<S: KvStore> CachedStore<S> {
    /// Wraps `base`.
    pub fn new(base: S) -> Self {
        Self {
            base,
            staged: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of keys with staged changes.
    pub fn staged_len(&self) -> usize {
        self.staged.lock().len()
    }

    /// Writes everything staged to `base` as one batch.
    pub fn commit(self) -> DbResult<()> {
        let staged = self.staged.into_inner();
        if staged.is_empty() {
            return Ok(());
        }

        let mut batch = WriteBatch::new();
        for (key, value) in staged {
            match value {
                Some(value) => batch.put(key, value),
                None => batch.delete(key),
            }
        }
        trace!(ops = batch.len(), "committing cached writes");

        self.base.write(batch)
    }
}

impl<S: KvStore> KvStore for CachedStore<S> {
    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        if let Some(staged) = self.staged.lock().get(key) {
            return Ok(staged.clone());
        }
        self.base.get(key)
    }

    fn write(&self, batch: WriteBatch) -> DbResult<()> {
        let mut staged = self.staged.lock();
        for (key, value) in batch.into_ops() {
            staged.insert(key, value);
        }

        Ok(())
    }
}
