use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::DbResult;

/// A set of writes applied together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<(Vec<u8>, Option<Vec<u8>>)>,
}

impl WriteBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a write of `value` under `key`.
    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push((key.into(), Some(value.into())));
    }

    /// Stages a bincode-encoded write.
    pub fn put_value<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<Vec<u8>>,
        value: &T,
    ) -> DbResult<()> {
        self.put(key, bincode::serialize(value)?);
        Ok(())
    }

    /// Stages a removal of `key`.
    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.ops.push((key.into(), None));
    }

    /// Number of staged operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consumes the batch, yielding operations in staging order. `None` marks a removal.
    pub fn into_ops(self) -> impl Iterator<Item = (Vec<u8>, Option<Vec<u8>>)> {
        self.ops.into_iter()
    }
}

/// A byte-oriented key-value store.
///
/// Implementations must apply a [`WriteBatch`] atomically: after [`KvStore::write`] returns an
/// error, none of the batch is visible.
pub trait KvStore: Send + Sync {
    /// Reads the value under `key`.
    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>>;

    /// Applies `batch` atomically.
    fn write(&self, batch: WriteBatch) -> DbResult<()>;

    /// Whether `key` holds a value.
    fn contains(&self, key: &[u8]) -> DbResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn write(&self, batch: WriteBatch) -> DbResult<()> {
        (**self).write(batch)
    }

    fn contains(&self, key: &[u8]) -> DbResult<bool> {
        (**self).contains(key)
    }
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn write(&self, batch: WriteBatch) -> DbResult<()> {
        (**self).write(batch)
    }

    fn contains(&self, key: &[u8]) -> DbResult<bool> {
        (**self).contains(key)
    }
}

/// Typed helpers over [`KvStore`]; values are bincode-encoded.
pub trait KvStoreExt: KvStore {
    /// Reads and decodes the value under `key`.
    fn get_value<T: DeserializeOwned>(&self, key: &[u8]) -> DbResult<Option<T>> {
        self.get(key)?
            .map(|bytes| bincode::deserialize(&bytes))
            .transpose()
            .map_err(Into::into)
    }

    /// Encodes and writes a single value.
    fn put_value<T: Serialize + ?Sized>(&self, key: &[u8], value: &T) -> DbResult<()> {
        let mut batch = WriteBatch::new();
        batch.put_value(key, value)?;
        self.write(batch)
    }
}

impl<S: KvStore + ?Sized> KvStoreExt for S {}
