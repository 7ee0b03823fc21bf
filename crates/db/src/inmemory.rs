//! In-memory store, used by tests and by embedders that don't need persistence.

use std::{collections::BTreeMap, sync::Arc};

use parking_lot::RwLock;

use crate::{
    errors::DbResult,
    store::{KvStore, WriteBatch},
};

/// A store kept in a shared ordered map.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    entries: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn write(&self, batch: WriteBatch) -> DbResult<()> {
        let mut entries = self.entries.write();
        for (key, value) in batch.into_ops() {
            match value {
                Some(value) => {
                    entries.insert(key, value);
                }
                None => {
                    entries.remove(&key);
                }
            }
        }

        Ok(())
    }

    fn contains(&self, key: &[u8]) -> DbResult<bool> {
        Ok(self.entries.read().contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KvStoreExt;

    #[test]
    fn batch_is_applied_in_order() {
        let store = MemStore::new();

        let mut batch = WriteBatch::new();
        batch.put(b"a".to_vec(), b"1".to_vec());
        batch.put(b"b".to_vec(), b"2".to_vec());
        batch.delete(b"a".to_vec());
        batch.put(b"b".to_vec(), b"3".to_vec());
        store.write(batch).unwrap();

        assert_eq!(store.get(b"a").unwrap(), None);
        assert_eq!(store.get(b"b").unwrap(), Some(b"3".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clones_share_state() {
        let store = MemStore::new();
        let other = store.clone();

        store.put_value(b"height", &42u64).unwrap();
        assert_eq!(other.get_value::<u64>(b"height").unwrap(), Some(42));
        assert!(other.contains(b"height").unwrap());
    }

    #[test]
    fn undecodable_value_is_an_error() {
        let store = MemStore::new();
        let mut batch = WriteBatch::new();
        batch.put(b"k".to_vec(), vec![1u8]);
        store.write(batch).unwrap();

        assert!(store.get_value::<u64>(b"k").is_err());
    }
}
