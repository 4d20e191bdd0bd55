//! In-memory stand-ins for the storage/network/transport traits, used by
//! the end-to-end tests and by anyone wiring up a quick local demo.

mod network;
mod store;
mod transport;

pub use network::Network;
pub use store::MemoryStore;
pub use transport::FakeTransport;

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dt_core::counter::TransferIdCounter;
use dt_core::error::Result;
use dt_protocol::TransferId;

/// A [`TransferIdCounter`] that hands out sequential ids starting at 1,
/// with no persistence. Good enough for a single process's test run.
pub struct SequentialCounter {
    next: AtomicU64,
}

impl SequentialCounter {
    pub fn new() -> Self {
        SequentialCounter { next: AtomicU64::new(1) }
    }
}

impl Default for SequentialCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferIdCounter for SequentialCounter {
    async fn next(&self) -> Result<TransferId> {
        Ok(TransferId(self.next.fetch_add(1, Ordering::SeqCst)))
    }
}
