//! The peer-to-peer messaging interface consumed by the core (§6).

use std::sync::Arc;

use async_trait::async_trait;
use dt_protocol::{ChannelId, PeerId};

use crate::error::Result;
use crate::message::DataTransferMessage;

/// Delegate invoked when a message for a channel arrives over the network.
/// Implemented by the Event Pipeline.
#[async_trait]
pub trait NetworkReceiver: Send + Sync {
    /// `Some(reply)` is sent back to `peer` on the same channel; `None`
    /// means no reply is owed (e.g. a plain cancel).
    async fn on_request_received(
        &self,
        id: ChannelId,
        peer: PeerId,
        request: dt_protocol::DataTransferRequest,
    ) -> Result<Option<dt_protocol::DataTransferResponse>>;

    async fn on_response_received(
        &self,
        id: ChannelId,
        response: dt_protocol::DataTransferResponse,
    ) -> Result<()>;
}

#[async_trait]
pub trait DataTransferNetwork: Send + Sync {
    fn set_delegate(&self, receiver: Arc<dyn NetworkReceiver>);

    /// `id` is carried alongside the peer so implementations can route the
    /// message onto the substream/session already associated with that
    /// channel rather than re-deriving it from message contents.
    async fn send_message(
        &self,
        peer: &PeerId,
        id: ChannelId,
        message: DataTransferMessage,
    ) -> Result<()>;

    fn id(&self) -> PeerId;

    /// Hints the libp2p-style connection manager to keep this peer's
    /// connection alive for the duration of the channel.
    async fn protect(&self, peer: &PeerId, tag: &str) -> Result<()>;

    async fn unprotect(&self, peer: &PeerId, tag: &str) -> Result<()>;

    async fn connect_to(&self, peer: &PeerId) -> Result<()>;
}
