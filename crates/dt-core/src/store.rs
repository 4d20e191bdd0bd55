//! The persistence interface consumed by the core (§6): a minimal
//! key-value store with prefix scan, enough to durably mirror the channel
//! registry and recover it after a crash.

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait Store: Send + Sync {
    async fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;
    async fn delete(&self, key: &[u8]) -> Result<()>;
    async fn query_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;
}
