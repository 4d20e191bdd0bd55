//! Monotonic, crash-safe counter for locally originated transfer ids (§6).

use async_trait::async_trait;

use dt_protocol::TransferId;

use crate::error::Result;
use crate::store::Store;

#[async_trait]
pub trait TransferIdCounter: Send + Sync {
    async fn next(&self) -> Result<TransferId>;
}

/// A [`TransferIdCounter`] backed by a single [`Store`] entry, guarded by an
/// in-process lock so concurrent `next()` callers never observe the same
/// value even before the write to `store` lands.
pub struct StoredCounter<S: Store> {
    store: S,
    key: Vec<u8>,
    guard: tokio::sync::Mutex<()>,
}

impl<S: Store> StoredCounter<S> {
    pub fn new(store: S) -> Self {
        StoredCounter {
            store,
            key: b"__transfer_id_counter__".to_vec(),
            guard: tokio::sync::Mutex::new(()),
        }
    }
}

#[async_trait]
impl<S: Store> TransferIdCounter for StoredCounter<S> {
    async fn next(&self) -> Result<TransferId> {
        let _lock = self.guard.lock().await;
        let current = match self.store.get(&self.key).await? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes
                    .try_into()
                    .map_err(|_| crate::error::Error::Internal("corrupt counter value".into()))?;
                u64::from_be_bytes(arr)
            }
            None => 0,
        };
        let next = current + 1;
        self.store.put(&self.key, &next.to_be_bytes()).await?;
        Ok(TransferId(next))
    }
}
