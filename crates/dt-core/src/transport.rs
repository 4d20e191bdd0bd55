//! The block-transport interface consumed by the core (§6). The core never
//! moves bytes itself; it drives a transport through this capability set
//! and receives data-flow callbacks through [`TransportEventHandler`].

use std::sync::Arc;

use async_trait::async_trait;
use dt_protocol::{Cid, ChannelId, DataTransferRequest, PeerId, Selector};

use crate::error::{Error, Result};
use crate::message::DataTransferMessage;

/// Callbacks a transport drives into the core as data moves. Implemented by
/// the Event Pipeline; registered with a transport via
/// [`Transport::set_event_handler`].
#[async_trait]
pub trait TransportEventHandler: Send + Sync {
    async fn on_data_received(&self, id: ChannelId, link: Option<Cid>, size: u64) -> Result<()>;

    /// Returns a message to transmit alongside the next outbound block, if
    /// revalidation produced one.
    async fn on_data_queued(
        &self,
        id: ChannelId,
        link: Option<Cid>,
        size: u64,
    ) -> Result<Option<DataTransferMessage>>;

    async fn on_data_sent(&self, id: ChannelId, link: Option<Cid>, size: u64) -> Result<()>;

    async fn on_channel_completed(&self, id: ChannelId, err: Option<Error>) -> Result<()>;

    async fn on_request_timed_out(&self, id: ChannelId, err: Error) -> Result<()>;

    async fn on_request_disconnected(&self, id: ChannelId, err: Error) -> Result<()>;

    async fn on_send_data_error(&self, id: ChannelId, err: Error) -> Result<()>;
}

#[async_trait]
pub trait Transport: Send + Sync {
    fn set_event_handler(&self, handler: Arc<dyn TransportEventHandler>);

    async fn open_channel(
        &self,
        remote: &PeerId,
        id: &ChannelId,
        root: &Cid,
        selector: &Selector,
        initial_message: Option<DataTransferRequest>,
    ) -> Result<()>;

    async fn close_channel(&self, id: &ChannelId) -> Result<()>;

    /// Infallible local cleanup after a remote cancel.
    async fn cleanup_channel(&self, id: &ChannelId);
}

/// Optional pause/resume capability. Transports that can't suspend
/// in-flight traffic simply don't implement it; callers that need it probe
/// for it (see `Manager::pause`/`Manager::resume`, which return
/// [`Error::UnsupportedOperation`] when the transport lacks it).
#[async_trait]
pub trait PauseableTransport: Transport {
    async fn pause_channel(&self, id: &ChannelId) -> Result<()>;
    async fn resume_channel(&self, id: &ChannelId, message: Option<DataTransferRequest>) -> Result<()>;
}
