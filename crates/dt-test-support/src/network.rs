use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use dt_core::error::{Error, Result};
use dt_core::message::DataTransferMessage;
use dt_core::network::{DataTransferNetwork, NetworkReceiver};
use dt_protocol::{ChannelId, PeerId};

/// An in-process `DataTransferNetwork` that wires a handful of peers
/// together directly, without sockets. `send_message` delivers synchronously
/// to the target's registered delegate and, for requests, feeds any
/// synthesized reply straight back to the sender's own delegate — mirroring
/// how a request/response substream would round-trip in a real transport.
pub struct Network {
    id: PeerId,
    delegate: RwLock<Option<Arc<dyn NetworkReceiver>>>,
    peers: Mutex<HashMap<PeerId, Arc<Network>>>,
}

impl Network {
    pub fn new(id: PeerId) -> Arc<Self> {
        Arc::new(Network {
            id,
            delegate: RwLock::new(None),
            peers: Mutex::new(HashMap::new()),
        })
    }

    /// Registers each network as the other's peer, so either side can
    /// address the other by `PeerId`.
    pub fn connect(a: &Arc<Network>, b: &Arc<Network>) {
        a.peers.lock().unwrap().insert(b.id.clone(), b.clone());
        b.peers.lock().unwrap().insert(a.id.clone(), a.clone());
    }

    /// The delegate this network itself is registered with (i.e. what
    /// `send_message` uses to deliver a synthesized reply back to the
    /// sender). Exposed so [`crate::FakeTransport`] can piggyback a pull
    /// request the same way a real transport stream would.
    pub fn delegate(&self) -> Result<Arc<dyn NetworkReceiver>> {
        self.delegate
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::Network(format!("{} has no delegate registered", self.id)))
    }

    /// The delegate registered by `peer`, for delivering a request or
    /// response addressed to it.
    pub fn delegate_for(&self, peer: &PeerId) -> Result<Arc<dyn NetworkReceiver>> {
        self.peer(peer)?.delegate()
    }

    fn peer(&self, peer: &PeerId) -> Result<Arc<Network>> {
        self.peers
            .lock()
            .unwrap()
            .get(peer)
            .cloned()
            .ok_or_else(|| Error::Network(format!("no route from {} to {}", self.id, peer)))
    }
}

#[async_trait]
impl DataTransferNetwork for Network {
    fn set_delegate(&self, receiver: Arc<dyn NetworkReceiver>) {
        *self.delegate.write().unwrap() = Some(receiver);
    }

    async fn send_message(
        &self,
        peer: &PeerId,
        id: ChannelId,
        message: DataTransferMessage,
    ) -> Result<()> {
        let target = self.peer(peer)?;
        let target_delegate = target.delegate()?;

        match message {
            DataTransferMessage::Request(request) => {
                let reply = target_delegate
                    .on_request_received(id.clone(), self.id.clone(), request)
                    .await?;
                if let Some(response) = reply {
                    self.delegate()?.on_response_received(id, response).await?;
                }
            }
            DataTransferMessage::Response(response) => {
                target_delegate.on_response_received(id, response).await?;
            }
        }
        Ok(())
    }

    fn id(&self) -> PeerId {
        self.id.clone()
    }

    async fn protect(&self, _peer: &PeerId, _tag: &str) -> Result<()> {
        Ok(())
    }

    async fn unprotect(&self, _peer: &PeerId, _tag: &str) -> Result<()> {
        Ok(())
    }

    async fn connect_to(&self, peer: &PeerId) -> Result<()> {
        self.peer(peer).map(|_| ())
    }
}
