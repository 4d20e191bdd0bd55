//! Public API (§4.6): the façade applications drive — opening transfers,
//! sending vouchers, pausing/resuming/closing, and subscribing to events.

use std::collections::HashMap;
use std::sync::Arc;

use dt_protocol::{Cid, ChannelId, EncodedVoucher, PeerId, Selector, TransferId, TypeIdentifier};

use crate::channel::Channel;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::handler_registry::Decoder;
use crate::handlers::{RequestValidator, Revalidator, TransportConfigurer, Voucher, VoucherResult};
use crate::message::{self, DataTransferMessage};
use crate::network::{DataTransferNetwork, NetworkReceiver};
use crate::notifier::{Notifier, Subscriber, SubscriptionId};
use crate::pipeline::EventPipeline;
use crate::registry::ChannelRegistry;
use crate::status::Status;
use crate::store::Store;
use crate::transport::{PauseableTransport, Transport};

pub struct Manager {
    local_peer: PeerId,
    registry: Arc<ChannelRegistry>,
    notifier: Arc<Notifier>,
    network: Arc<dyn DataTransferNetwork>,
    transport: Arc<dyn Transport>,
    /// Present only when the wired-in transport also implements
    /// [`PauseableTransport`]; `pause`/`resume` return
    /// [`Error::UnsupportedOperation`] when it's absent, per §6's "optional:
    /// pause_channel, resume_channel".
    pauseable_transport: Option<Arc<dyn PauseableTransport>>,
    counter: Arc<dyn crate::counter::TransferIdCounter>,
    pipeline: Arc<EventPipeline>,
}

impl Manager {
    /// Wires the registry, network, transport, and event pipeline together,
    /// registers the pipeline as the network delegate and transport event
    /// handler, and restores channel state from `store` (crash recovery).
    ///
    /// `pauseable_transport` should be `Some` of the same underlying
    /// transport as `transport` whenever it also implements
    /// [`PauseableTransport`] — Rust trait objects can't be downcast to a
    /// richer trait at runtime, so the caller supplies both handles.
    pub async fn new(
        local_peer: PeerId,
        store: Arc<dyn Store>,
        network: Arc<dyn DataTransferNetwork>,
        transport: Arc<dyn Transport>,
        pauseable_transport: Option<Arc<dyn PauseableTransport>>,
        counter: Arc<dyn crate::counter::TransferIdCounter>,
    ) -> Result<Arc<Self>> {
        let notifier = Arc::new(Notifier::new());
        let registry = Arc::new(ChannelRegistry::load(store, notifier.clone()).await?);
        let pipeline = Arc::new(EventPipeline::new(
            local_peer.clone(),
            registry.clone(),
            network.clone(),
            transport.clone(),
        ));

        network.set_delegate(pipeline.clone() as Arc<dyn NetworkReceiver>);
        transport.set_event_handler(pipeline.clone() as Arc<dyn crate::transport::TransportEventHandler>);

        Ok(Arc::new(Manager {
            local_peer,
            registry,
            notifier,
            network,
            transport,
            pauseable_transport,
            counter,
            pipeline,
        }))
    }

    pub async fn register_voucher_type(
        &self,
        type_id: TypeIdentifier,
        decoder: Decoder<dyn Voucher>,
        validator: Arc<dyn RequestValidator>,
    ) -> Result<()> {
        self.pipeline
            .register_voucher_type(type_id, decoder, validator)
            .await
    }

    pub async fn register_revalidator(
        &self,
        type_id: TypeIdentifier,
        decoder: Decoder<dyn Voucher>,
        revalidator: Arc<dyn Revalidator>,
    ) -> Result<()> {
        self.pipeline
            .register_revalidator(type_id, decoder, revalidator)
            .await
    }

    pub async fn register_voucher_result_type(
        &self,
        type_id: TypeIdentifier,
        decoder: Decoder<dyn VoucherResult>,
    ) -> Result<()> {
        self.pipeline
            .register_voucher_result_type(type_id, decoder)
            .await
    }

    pub async fn register_transport_configurer(
        &self,
        type_id: TypeIdentifier,
        configurer: Arc<dyn TransportConfigurer>,
    ) {
        self.pipeline
            .register_transport_configurer(type_id, configurer)
            .await
    }

    async fn next_transfer_id(&self) -> Result<TransferId> {
        self.counter.next().await
    }

    pub async fn open_push(
        &self,
        to: PeerId,
        voucher: EncodedVoucher,
        base_cid: Cid,
        selector: Selector,
    ) -> Result<ChannelId> {
        let transfer_id = self.next_transfer_id().await?;
        let id = ChannelId::new(self.local_peer.clone(), to.clone(), transfer_id);

        self.registry
            .create_new(
                id.clone(),
                base_cid.clone(),
                selector.clone(),
                voucher.clone(),
                self.local_peer.clone(),
                to.clone(),
            )
            .await?;

        let request = message::new_request(transfer_id, false, voucher, base_cid, selector);
        if let Err(err) = self
            .network
            .send_message(&to, id.clone(), DataTransferMessage::Request(request))
            .await
        {
            self.registry.error(&id, err.to_string()).await?;
            return Err(err);
        }

        Ok(id)
    }

    pub async fn open_pull(
        &self,
        to: PeerId,
        voucher: EncodedVoucher,
        base_cid: Cid,
        selector: Selector,
    ) -> Result<ChannelId> {
        let transfer_id = self.next_transfer_id().await?;
        let id = ChannelId::new(self.local_peer.clone(), to.clone(), transfer_id);

        self.registry
            .create_new(
                id.clone(),
                base_cid.clone(),
                selector.clone(),
                voucher.clone(),
                to.clone(),
                self.local_peer.clone(),
            )
            .await?;

        let request = message::new_request(transfer_id, true, voucher, base_cid.clone(), selector.clone());
        if let Err(err) = self
            .transport
            .open_channel(&to, &id, &base_cid, &selector, Some(request))
            .await
        {
            self.registry.error(&id, err.to_string()).await?;
            return Err(err);
        }

        Ok(id)
    }

    pub async fn send_voucher(&self, id: &ChannelId, voucher: EncodedVoucher) -> Result<()> {
        if !id.is_initiator(&self.local_peer) {
            return Err(Error::UnsupportedOperation(
                "only the initiator may send a voucher update",
            ));
        }
        let channel = self.registry.get(id).await?;
        let request = message::voucher_update_request(channel.id.transfer_id, voucher.clone());
        self.network
            .send_message(
                id.other_party(&self.local_peer),
                id.clone(),
                DataTransferMessage::Request(request),
            )
            .await?;
        self.registry.new_voucher(id, voucher.type_id, voucher.bytes).await?;
        Ok(())
    }

    pub async fn close(&self, id: &ChannelId) -> Result<()> {
        self.transport.close_channel(id).await?;
        let channel = self.registry.get(id).await?;
        let request = message::cancel_request(channel.id.transfer_id);
        self.network
            .send_message(
                id.other_party(&self.local_peer),
                id.clone(),
                DataTransferMessage::Request(request),
            )
            .await?;
        self.registry.cancel(id).await?;
        Ok(())
    }

    fn pauseable_transport(&self) -> Result<&Arc<dyn PauseableTransport>> {
        self.pauseable_transport
            .as_ref()
            .ok_or(Error::UnsupportedOperation("transport does not support pause/resume"))
    }

    pub async fn pause(&self, id: &ChannelId) -> Result<()> {
        let channel = self.registry.get(id).await?;
        let transport = self.pauseable_transport()?;
        transport.pause_channel(id).await?;
        let request = message::pause_resume_request(channel.id.transfer_id, true);
        self.network
            .send_message(
                id.other_party(&self.local_peer),
                id.clone(),
                DataTransferMessage::Request(request),
            )
            .await?;
        let event = match channel.role(&self.local_peer) {
            crate::channel::Role::Initiator => Event::PauseInitiator,
            crate::channel::Role::Responder => Event::PauseResponder,
        };
        self.registry.apply(id, event).await?;
        Ok(())
    }

    pub async fn resume(&self, id: &ChannelId) -> Result<()> {
        let channel = self.registry.get(id).await?;
        let transport = self.pauseable_transport()?;
        transport.resume_channel(id, None).await?;
        let request = message::pause_resume_request(channel.id.transfer_id, false);
        self.network
            .send_message(
                id.other_party(&self.local_peer),
                id.clone(),
                DataTransferMessage::Request(request),
            )
            .await?;
        let event = match channel.role(&self.local_peer) {
            crate::channel::Role::Initiator => Event::ResumeInitiator,
            crate::channel::Role::Responder => Event::ResumeResponder,
        };
        self.registry.apply(id, event).await?;
        Ok(())
    }

    pub async fn status(&self, id: &ChannelId) -> Result<Status> {
        Ok(self.registry.get(id).await?.status)
    }

    pub async fn get(&self, id: &ChannelId) -> Result<Channel> {
        self.registry.get(id).await
    }

    pub fn subscribe(&self, f: Subscriber) -> SubscriptionId {
        self.notifier.subscribe(f)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.notifier.unsubscribe(id)
    }

    pub async fn in_progress(&self) -> HashMap<ChannelId, Channel> {
        self.registry.in_progress().await
    }
}
