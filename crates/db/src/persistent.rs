//! Sled-backed persistent store.

use std::{fmt, path::Path};

use tracing::{debug, instrument};

use crate::{
    errors::DbResult,
    store::{KvStore, WriteBatch},
};

/// A store persisted in a [sled](https://sled.rs) database.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl fmt::Debug for SledStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SledStore").finish()
    }
}

impl SledStore {
    /// Opens, or creates, the database at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let db = sled::Config::new()
            .path(path.as_ref())
            .mode(sled::Mode::HighThroughput)
            .open()?;
        debug!(recovered = db.was_recovered(), "opened sled database");

        Ok(Self { db })
    }

    /// Opens a database that is removed when dropped.
    pub fn temporary() -> DbResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Flushes dirty buffers to disk.
    pub fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl KvStore for SledStore {
    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|value| value.to_vec()))
    }

    #[instrument(skip_all, fields(ops = batch.len()))]
    fn write(&self, batch: WriteBatch) -> DbResult<()> {
        let mut sled_batch = sled::Batch::default();
        for (key, value) in batch.into_ops() {
            match value {
                Some(value) => sled_batch.insert(key, value),
                None => sled_batch.remove(key),
            }
        }
        self.db.apply_batch(sled_batch)?;

        Ok(())
    }

    fn contains(&self, key: &[u8]) -> DbResult<bool> {
        Ok(self.db.contains_key(key)?)
    }
}
