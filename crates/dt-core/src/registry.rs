//! Channel Registry (§4.2): owns every live channel, keeps a durable
//! mirror, and is the sole path through which channel state mutates.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use dt_protocol::{Cid, ChannelId, EncodedVoucher, PeerId, Selector, TypeIdentifier};

use crate::channel::Channel;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::fsm;
use crate::notifier::Notifier;
use crate::store::Store;

const KEY_PREFIX: &[u8] = b"channel/";

fn key_for(id: &ChannelId) -> Vec<u8> {
    let mut key = KEY_PREFIX.to_vec();
    key.extend_from_slice(id.to_string().as_bytes());
    key
}

pub struct ChannelRegistry {
    store: Arc<dyn Store>,
    channels: RwLock<HashMap<ChannelId, Arc<Mutex<Channel>>>>,
    notifier: Arc<Notifier>,
}

impl ChannelRegistry {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<Notifier>) -> Self {
        ChannelRegistry {
            store,
            channels: RwLock::new(HashMap::new()),
            notifier,
        }
    }

    /// Rebuilds the in-memory map from the durable mirror. Called once at
    /// startup to recover from a crash.
    pub async fn load(store: Arc<dyn Store>, notifier: Arc<Notifier>) -> Result<Self> {
        let rows = store.query_prefix(KEY_PREFIX).await?;
        let mut channels = HashMap::with_capacity(rows.len());
        for (_, value) in rows {
            let channel: Channel = serde_json::from_slice(&value)
                .map_err(|e| Error::Internal(format!("corrupt channel record: {e}")))?;
            channels.insert(channel.id.clone(), Arc::new(Mutex::new(channel)));
        }
        Ok(ChannelRegistry {
            store,
            channels: RwLock::new(channels),
            notifier,
        })
    }

    async fn persist(&self, channel: &Channel) -> Result<()> {
        let bytes = serde_json::to_vec(channel)
            .map_err(|e| Error::Internal(format!("failed to encode channel record: {e}")))?;
        self.store.put(&key_for(&channel.id), &bytes).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_new(
        &self,
        id: ChannelId,
        base_cid: Cid,
        selector: Selector,
        voucher: EncodedVoucher,
        sender: PeerId,
        receiver: PeerId,
    ) -> Result<ChannelId> {
        let mut channels = self.channels.write().await;
        if channels.contains_key(&id) {
            return Err(Error::AlreadyExists(id));
        }
        let channel = Channel::new(id.clone(), base_cid, selector, sender, receiver, voucher);
        self.persist(&channel).await?;
        channels.insert(id.clone(), Arc::new(Mutex::new(channel)));
        Ok(id)
    }

    async fn entry(&self, id: &ChannelId) -> Result<Arc<Mutex<Channel>>> {
        self.channels
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.clone()))
    }

    pub async fn get(&self, id: &ChannelId) -> Result<Channel> {
        let entry = self.entry(id).await?;
        Ok(entry.lock().await.clone())
    }

    pub async fn has(&self, id: &ChannelId) -> bool {
        self.channels.read().await.contains_key(id)
    }

    pub async fn in_progress(&self) -> HashMap<ChannelId, Channel> {
        let channels = self.channels.read().await;
        let mut snapshot = HashMap::new();
        for (id, entry) in channels.iter() {
            let channel = entry.lock().await;
            if !channel.status.is_terminal() {
                snapshot.insert(id.clone(), channel.clone());
            }
        }
        snapshot
    }

    /// Applies `event` to the channel `id` under its per-channel lock,
    /// persists the result before anyone else can observe it, and invokes
    /// the notifier from inside that same critical section (§5).
    pub async fn apply(&self, id: &ChannelId, event: Event) -> Result<Channel> {
        let entry = self.entry(id).await?;
        let mut channel = entry.lock().await;
        fsm::apply(&mut channel, event.clone());
        self.persist(&channel).await?;
        self.notifier.publish(&event, &channel);
        Ok(channel.clone())
    }

    pub async fn accept(&self, id: &ChannelId) -> Result<Channel> {
        self.apply(id, Event::Accept).await
    }

    pub async fn restart(&self, id: &ChannelId) -> Result<Channel> {
        self.apply(id, Event::Restart).await
    }

    pub async fn cancel(&self, id: &ChannelId) -> Result<Channel> {
        self.apply(id, Event::Cancel).await
    }

    pub async fn data_received(&self, id: &ChannelId, size: u64) -> Result<Channel> {
        self.apply(
            id,
            Event::Progress {
                delta_sent: 0,
                delta_received: size,
            },
        )
        .await
    }

    pub async fn data_sent(&self, id: &ChannelId, size: u64) -> Result<Channel> {
        self.apply(
            id,
            Event::Progress {
                delta_sent: size,
                delta_received: 0,
            },
        )
        .await
    }

    pub async fn data_queued(&self, id: &ChannelId, size: u64) -> Result<Channel> {
        self.apply(
            id,
            Event::Progress {
                delta_sent: size,
                delta_received: 0,
            },
        )
        .await
    }

    pub async fn pause_initiator(&self, id: &ChannelId) -> Result<Channel> {
        self.apply(id, Event::PauseInitiator).await
    }

    pub async fn pause_responder(&self, id: &ChannelId) -> Result<Channel> {
        self.apply(id, Event::PauseResponder).await
    }

    pub async fn resume_initiator(&self, id: &ChannelId) -> Result<Channel> {
        self.apply(id, Event::ResumeInitiator).await
    }

    pub async fn resume_responder(&self, id: &ChannelId) -> Result<Channel> {
        self.apply(id, Event::ResumeResponder).await
    }

    pub async fn new_voucher(
        &self,
        id: &ChannelId,
        type_id: TypeIdentifier,
        bytes: Vec<u8>,
    ) -> Result<Channel> {
        self.apply(id, Event::NewVoucher { type_id, bytes }).await
    }

    pub async fn new_voucher_result(
        &self,
        id: &ChannelId,
        type_id: TypeIdentifier,
        bytes: Vec<u8>,
    ) -> Result<Channel> {
        self.apply(id, Event::NewVoucherResult { type_id, bytes })
            .await
    }

    pub async fn error(&self, id: &ChannelId, message: impl Into<String>) -> Result<Channel> {
        self.apply(id, Event::Error(message.into())).await
    }

    pub async fn finish_transfer(&self, id: &ChannelId) -> Result<Channel> {
        self.apply(id, Event::FinishTransfer).await
    }

    pub async fn responder_begins_finalization(&self, id: &ChannelId) -> Result<Channel> {
        self.apply(id, Event::ResponderBeginsFinalization).await
    }

    pub async fn responder_completes(&self, id: &ChannelId) -> Result<Channel> {
        self.apply(id, Event::ResponderCompletes).await
    }

    pub async fn begin_finalizing(&self, id: &ChannelId) -> Result<Channel> {
        self.apply(id, Event::BeginFinalizing).await
    }

    pub async fn complete(&self, id: &ChannelId) -> Result<Channel> {
        self.apply(id, Event::Complete).await
    }
}
