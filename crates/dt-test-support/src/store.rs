use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use dt_core::error::Result;
use dt_core::store::Store;

/// An in-process [`Store`] backed by a `BTreeMap`, so `query_prefix` can
/// walk a sorted range instead of filtering every key.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.data.lock().unwrap().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        self.data.lock().unwrap().remove(key);
        Ok(())
    }

    async fn query_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prefix_scan_finds_only_matching_keys() {
        let store = MemoryStore::new();
        store.put(b"channel/a", b"1").await.unwrap();
        store.put(b"channel/b", b"2").await.unwrap();
        store.put(b"other/c", b"3").await.unwrap();

        let rows = store.query_prefix(b"channel/").await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn delete_removes_the_key() {
        let store = MemoryStore::new();
        store.put(b"k", b"v").await.unwrap();
        store.delete(b"k").await.unwrap();
        assert_eq!(store.get(b"k").await.unwrap(), None);
    }
}
