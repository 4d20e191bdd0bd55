use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use dt_core::error::{Error, Result};
use dt_core::message::DataTransferMessage;
use dt_core::transport::{PauseableTransport, Transport, TransportEventHandler};
use dt_protocol::{Cid, ChannelId, DataTransferRequest, PeerId, Selector};

use crate::Network;

/// An in-process `Transport` (and `PauseableTransport`) that moves no
/// bytes itself. Tests drive block flow explicitly via the
/// `simulate_*` methods, which call straight into whatever
/// `TransportEventHandler` the owning `Manager` registered.
///
/// `open_channel`'s piggybacked pull request is delivered through the
/// `Network` that was used to construct it, the same way `Network` would
/// route any other message — this only models the request/response leg;
/// the actual block transfer is left entirely to the test driver.
pub struct FakeTransport {
    network: Arc<Network>,
    handler: RwLock<Option<Arc<dyn TransportEventHandler>>>,
    paused: Mutex<HashSet<ChannelId>>,
}

impl FakeTransport {
    pub fn new(network: Arc<Network>) -> Arc<Self> {
        Arc::new(FakeTransport {
            network,
            handler: RwLock::new(None),
            paused: Mutex::new(HashSet::new()),
        })
    }

    fn handler(&self) -> Result<Arc<dyn TransportEventHandler>> {
        self.handler
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::Internal("transport has no event handler registered".into()))
    }

    pub fn is_paused(&self, id: &ChannelId) -> bool {
        self.paused.lock().unwrap().contains(id)
    }

    pub async fn simulate_block_received(&self, id: &ChannelId, link: Option<Cid>, size: u64) -> Result<()> {
        self.handler()?.on_data_received(id.clone(), link, size).await
    }

    pub async fn simulate_block_queued(
        &self,
        id: &ChannelId,
        link: Option<Cid>,
        size: u64,
    ) -> Result<Option<DataTransferMessage>> {
        self.handler()?.on_data_queued(id.clone(), link, size).await
    }

    pub async fn simulate_block_sent(&self, id: &ChannelId, link: Option<Cid>, size: u64) -> Result<()> {
        self.handler()?.on_data_sent(id.clone(), link, size).await
    }

    pub async fn simulate_channel_completed(&self, id: &ChannelId, err: Option<Error>) -> Result<()> {
        self.handler()?.on_channel_completed(id.clone(), err).await
    }

    pub async fn simulate_disconnected(&self, id: &ChannelId, err: Error) -> Result<()> {
        self.handler()?.on_request_disconnected(id.clone(), err).await
    }

    pub async fn simulate_timed_out(&self, id: &ChannelId, err: Error) -> Result<()> {
        self.handler()?.on_request_timed_out(id.clone(), err).await
    }

    pub async fn simulate_send_error(&self, id: &ChannelId, err: Error) -> Result<()> {
        self.handler()?.on_send_data_error(id.clone(), err).await
    }
}

#[async_trait]
impl Transport for FakeTransport {
    fn set_event_handler(&self, handler: Arc<dyn TransportEventHandler>) {
        *self.handler.write().unwrap() = Some(handler);
    }

    async fn open_channel(
        &self,
        remote: &PeerId,
        id: &ChannelId,
        _root: &Cid,
        _selector: &Selector,
        initial_message: Option<DataTransferRequest>,
    ) -> Result<()> {
        if let Some(request) = initial_message {
            let remote_delegate = self.network.delegate_for(remote)?;
            let reply = remote_delegate
                .on_request_received(id.clone(), self.network.id(), request)
                .await?;
            if let Some(response) = reply {
                self.network
                    .delegate()?
                    .on_response_received(id.clone(), response)
                    .await?;
            }
        }
        Ok(())
    }

    async fn close_channel(&self, id: &ChannelId) -> Result<()> {
        self.paused.lock().unwrap().remove(id);
        Ok(())
    }

    async fn cleanup_channel(&self, _id: &ChannelId) {}
}

#[async_trait]
impl PauseableTransport for FakeTransport {
    async fn pause_channel(&self, id: &ChannelId) -> Result<()> {
        self.paused.lock().unwrap().insert(id.clone());
        Ok(())
    }

    async fn resume_channel(&self, id: &ChannelId, _message: Option<DataTransferRequest>) -> Result<()> {
        self.paused.lock().unwrap().remove(id);
        Ok(())
    }
}
