//! Event Pipeline (§4.5): turns network messages and transport callbacks
//! into CSM events, runs voucher validation/revalidation, and synthesizes
//! reply messages. This is where most of the core's behavior lives.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use dt_protocol::{Cid, ChannelId, DataTransferRequest, DataTransferResponse, EncodedVoucher, PeerId, TransferId, TypeIdentifier};

use crate::channel::{Channel, Role};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::handler_registry::{Decoder, HandlerRegistry};
use crate::handlers::{RequestValidator, Revalidator, TransportConfigurer, Voucher, VoucherResult};
use crate::message::{self, DataTransferMessage};
use crate::network::{DataTransferNetwork, NetworkReceiver};
use crate::registry::ChannelRegistry;
use crate::transport::{Transport, TransportEventHandler};

pub type ValidatorRegistry = HandlerRegistry<dyn Voucher, Arc<dyn RequestValidator>>;
pub type RevalidatorRegistry = HandlerRegistry<dyn Voucher, Arc<dyn Revalidator>>;
pub type VoucherResultRegistry = HandlerRegistry<dyn VoucherResult, ()>;

pub struct EventPipeline {
    pub(crate) local_peer: PeerId,
    pub(crate) registry: Arc<ChannelRegistry>,
    pub(crate) network: Arc<dyn DataTransferNetwork>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) validated_types: RwLock<ValidatorRegistry>,
    pub(crate) revalidators: RwLock<RevalidatorRegistry>,
    pub(crate) result_types: RwLock<VoucherResultRegistry>,
    pub(crate) transport_configurers: RwLock<HashMap<TypeIdentifier, Arc<dyn TransportConfigurer>>>,
}

impl EventPipeline {
    pub fn new(
        local_peer: PeerId,
        registry: Arc<ChannelRegistry>,
        network: Arc<dyn DataTransferNetwork>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        EventPipeline {
            local_peer,
            registry,
            network,
            transport,
            validated_types: RwLock::new(HandlerRegistry::new()),
            revalidators: RwLock::new(HandlerRegistry::new()),
            result_types: RwLock::new(HandlerRegistry::new()),
            transport_configurers: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register_voucher_type(
        &self,
        type_id: TypeIdentifier,
        decoder: Decoder<dyn Voucher>,
        validator: Arc<dyn RequestValidator>,
    ) -> Result<()> {
        self.validated_types
            .write()
            .await
            .register(type_id, decoder, validator)
    }

    pub async fn register_revalidator(
        &self,
        type_id: TypeIdentifier,
        decoder: Decoder<dyn Voucher>,
        revalidator: Arc<dyn Revalidator>,
    ) -> Result<()> {
        self.revalidators.write().await.register(type_id, decoder, revalidator)
    }

    pub async fn register_voucher_result_type(
        &self,
        type_id: TypeIdentifier,
        decoder: Decoder<dyn VoucherResult>,
    ) -> Result<()> {
        self.result_types.write().await.register(type_id, decoder, ())
    }

    pub async fn register_transport_configurer(
        &self,
        type_id: TypeIdentifier,
        configurer: Arc<dyn TransportConfigurer>,
    ) {
        self.transport_configurers.write().await.insert(type_id, configurer);
    }

    async fn decode_voucher(
        registries: &RwLock<ValidatorRegistry>,
        voucher: &EncodedVoucher,
    ) -> Result<Box<dyn Voucher>> {
        let decoder = registries
            .read()
            .await
            .decoder(&voucher.type_id)
            .ok_or_else(|| Error::UnknownType(voucher.type_id.to_string()))?;
        decoder(&voucher.bytes)
    }

    /// `local is responder` ⇒ pause/resume-of-remote targets the
    /// initiator's half, and vice versa (§4.5 "pause-of-role helpers").
    fn remote_pause_event(&self, id: &ChannelId) -> Event {
        if id.responder == self.local_peer {
            Event::PauseInitiator
        } else {
            Event::PauseResponder
        }
    }

    fn remote_resume_event(&self, id: &ChannelId) -> Event {
        if id.responder == self.local_peer {
            Event::ResumeInitiator
        } else {
            Event::ResumeResponder
        }
    }

    fn local_pause_event(&self, channel: &Channel) -> Event {
        match channel.role(&self.local_peer) {
            Role::Initiator => Event::PauseInitiator,
            Role::Responder => Event::PauseResponder,
        }
    }

    fn local_resume_event(&self, channel: &Channel) -> Event {
        match channel.role(&self.local_peer) {
            Role::Initiator => Event::ResumeInitiator,
            Role::Responder => Event::ResumeResponder,
        }
    }

    /// Shared by the accept (new-request) and restart flows: decode and
    /// validate the voucher, create/restart the channel, wire up the
    /// transport configurer and connection protection, and apply the
    /// resulting CSM events.
    async fn accept_or_restart(
        &self,
        id: ChannelId,
        sender: PeerId,
        req: &DataTransferRequest,
        is_restart: bool,
    ) -> Result<DataTransferResponse> {
        if is_restart && id.is_initiator(&self.local_peer) {
            return Err(Error::UnsupportedOperation(
                "a restart request may not be handled by the channel's own initiator",
            ));
        }

        let voucher = Self::decode_voucher(&self.validated_types, &req.voucher).await?;
        let validator = self
            .validated_types
            .read()
            .await
            .processor(&req.voucher.type_id)
            .ok_or_else(|| Error::UnknownType(req.voucher.type_id.to_string()))?;

        let base_cid = req.base_cid.clone().ok_or_else(|| {
            Error::InvalidArgs("new/restart request missing base_cid".into())
        })?;
        let selector = req.selector.clone().ok_or_else(|| {
            Error::InvalidArgs("new/restart request missing selector".into())
        })?;

        let outcome = if req.is_pull {
            validator.validate_pull(&self.local_peer, voucher.as_ref(), &base_cid, &selector)
        } else {
            validator.validate_push(&sender, voucher.as_ref(), &base_cid, &selector)
        };

        let response = message::response_for_validation(req.transfer_id, !is_restart, &outcome)?;

        if !is_restart {
            let (sender_peer, receiver_peer) = if req.is_pull {
                (self.local_peer.clone(), sender.clone())
            } else {
                (sender.clone(), self.local_peer.clone())
            };
            self.registry
                .create_new(
                    id.clone(),
                    base_cid,
                    selector,
                    req.voucher.clone(),
                    sender_peer,
                    receiver_peer,
                )
                .await?;
        }

        if let Some(result) = outcome.result.as_deref() {
            self.registry
                .new_voucher_result(&id, result.type_id(), result.encode()?)
                .await?;
        }

        match &outcome.decision {
            crate::handlers::ValidationDecision::Rejected(reason) => {
                // §7: our own channel fails too, not just the reply we send.
                self.registry.error(&id, reason.clone()).await?;
                return Ok(response);
            }
            _ => {
                if is_restart {
                    self.registry.restart(&id).await?;
                } else {
                    self.registry.accept(&id).await?;
                }
            }
        }

        if let Some(configurer) = self.transport_configurers.read().await.get(&req.voucher.type_id) {
            configurer.configure(&id, voucher.as_ref());
        }

        self.network.protect(&sender, &id.to_string()).await?;

        if matches!(
            outcome.decision,
            crate::handlers::ValidationDecision::Paused
        ) {
            self.registry.pause_responder(&id).await?;
        }

        Ok(response)
    }

    async fn revalidation_pipeline(
        &self,
        id: ChannelId,
        req: &DataTransferRequest,
    ) -> Result<DataTransferResponse> {
        let voucher = Self::decode_voucher_revalidator(&self.revalidators, &req.voucher).await?;
        let revalidator = self
            .revalidators
            .read()
            .await
            .processor(&req.voucher.type_id)
            .ok_or_else(|| Error::UnknownType(req.voucher.type_id.to_string()))?;

        let outcome = revalidator.revalidate(&id, voucher.as_ref());
        self.apply_revalidation(&id, req.transfer_id, outcome).await
    }

    async fn decode_voucher_revalidator(
        registries: &RwLock<RevalidatorRegistry>,
        voucher: &EncodedVoucher,
    ) -> Result<Box<dyn Voucher>> {
        let decoder = registries
            .read()
            .await
            .decoder(&voucher.type_id)
            .ok_or_else(|| Error::UnknownType(voucher.type_id.to_string()))?;
        decoder(&voucher.bytes)
    }

    /// Applies the NewVoucher/NewVoucherResult/pause/resume effects of a
    /// revalidation decision and builds the matching reply.
    async fn apply_revalidation(
        &self,
        id: &ChannelId,
        transfer_id: TransferId,
        outcome: crate::handlers::RevalidationOutcome,
    ) -> Result<DataTransferResponse> {
        if let Some(result) = outcome.result.as_deref() {
            self.registry
                .new_voucher_result(id, result.type_id(), result.encode()?)
                .await?;
        }

        let channel = self.registry.get(id).await?;
        match &outcome.decision {
            crate::handlers::RevalidationDecision::Paused => {
                self.apply_local_pause(&channel).await?;
            }
            crate::handlers::RevalidationDecision::Resume => {
                self.apply_local_resume(&channel).await?;
            }
            crate::handlers::RevalidationDecision::Rejected(reason) => {
                // §7: revalidation errors fail our own channel state as
                // well as producing a rejecting response to the peer.
                self.registry.error(id, reason.clone()).await?;
            }
        }

        let channel = self.registry.get(id).await?;
        if channel.status == crate::status::Status::Finalizing {
            message::complete_response(transfer_id, &outcome)
        } else {
            message::voucher_result_response(transfer_id, &outcome)
        }
    }

    async fn apply_local_pause(&self, channel: &Channel) -> Result<()> {
        self.registry.apply(&channel.id, self.local_pause_event(channel)).await?;
        Ok(())
    }

    async fn apply_local_resume(&self, channel: &Channel) -> Result<()> {
        self.registry.apply(&channel.id, self.local_resume_event(channel)).await?;
        Ok(())
    }
}

#[async_trait]
impl NetworkReceiver for EventPipeline {
    async fn on_request_received(
        &self,
        id: ChannelId,
        peer: PeerId,
        req: DataTransferRequest,
    ) -> Result<Option<DataTransferResponse>> {
        if req.is_restart() {
            return self.accept_or_restart(id, peer, &req, true).await.map(Some);
        }
        if req.is_new() {
            return self.accept_or_restart(id, peer, &req, false).await.map(Some);
        }
        if req.is_cancel() {
            self.transport.cleanup_channel(&id).await;
            self.registry.cancel(&id).await?;
            return Ok(None);
        }
        if req.is_voucher() {
            self.registry
                .new_voucher(&id, req.voucher.type_id.clone(), req.voucher.bytes.clone())
                .await?;
            return self.revalidation_pipeline(id, &req).await.map(Some);
        }
        if req.is_paused {
            self.registry.apply(&id, self.remote_pause_event(&id)).await?;
            return Ok(None);
        }

        let channel = self.registry.apply(&id, self.remote_resume_event(&id)).await?;
        if matches!(
            channel.status,
            crate::status::Status::ResponderPaused | crate::status::Status::ResponderFinalizing
        ) {
            tracing::debug!(channel = %id, "resume-of-remote landed on a still-paused responder; transport stays suspended");
        }
        Ok(None)
    }

    async fn on_response_received(&self, id: ChannelId, resp: DataTransferResponse) -> Result<()> {
        if resp.is_cancel {
            self.registry.cancel(&id).await?;
            return Ok(());
        }

        // §4.5's "is_voucher_result with non-empty payload" only gates the
        // decode-and-append step; accepted/is_new/is_restart are checked on
        // every response regardless of whether it carries a voucher result
        // (the source's `IsVoucherResult`/`EmptyVoucherResult` are two
        // different checks, not one nested inside the other).
        if resp.is_voucher_result() {
            let decoder = self
                .result_types
                .read()
                .await
                .decoder(&resp.voucher_result.type_id)
                .ok_or_else(|| Error::UnknownType(resp.voucher_result.type_id.to_string()))?;
            let _typed: Box<dyn VoucherResult> = decoder(&resp.voucher_result.bytes)?;
            self.registry
                .new_voucher_result(&id, resp.voucher_result.type_id.clone(), resp.voucher_result.bytes.clone())
                .await?;
        }

        if !resp.accepted {
            self.registry.error(&id, "remote rejected voucher").await?;
            return Ok(());
        }
        if resp.is_new {
            self.registry.accept(&id).await?;
        }
        if resp.is_restart {
            self.registry.restart(&id).await?;
        }

        if resp.is_complete && resp.accepted {
            if !resp.is_paused {
                self.registry.responder_completes(&id).await?;
                return Ok(());
            }
            self.registry.responder_begins_finalization(&id).await?;
        }

        if resp.is_paused {
            self.registry.apply(&id, self.remote_pause_event(&id)).await?;
        } else {
            self.registry.apply(&id, self.remote_resume_event(&id)).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl TransportEventHandler for EventPipeline {
    async fn on_data_received(&self, id: ChannelId, _link: Option<Cid>, size: u64) -> Result<()> {
        self.registry.data_received(&id, size).await?;

        let channel = self.registry.get(&id).await?;
        if matches!(channel.role(&self.local_peer), Role::Responder) {
            let claimed = self
                .revalidators
                .read()
                .await
                .each(|_, revalidator| match revalidator.on_push_data_received(&id, size) {
                    Some(outcome) => std::ops::ControlFlow::Break(outcome),
                    None => std::ops::ControlFlow::Continue(()),
                });
            if let Some(outcome) = claimed {
                let _ = self.apply_revalidation(&id, id.transfer_id, outcome).await?;
            }
        }
        Ok(())
    }

    async fn on_data_queued(
        &self,
        id: ChannelId,
        _link: Option<Cid>,
        size: u64,
    ) -> Result<Option<DataTransferMessage>> {
        self.registry.data_queued(&id, size).await?;

        let channel = self.registry.get(&id).await?;
        if matches!(channel.role(&self.local_peer), Role::Responder) {
            let claimed = self
                .revalidators
                .read()
                .await
                .each(|_, revalidator| match revalidator.on_pull_data_sent(&id, size) {
                    Some(outcome) => std::ops::ControlFlow::Break(outcome),
                    None => std::ops::ControlFlow::Continue(()),
                });
            if let Some(outcome) = claimed {
                let response = self.apply_revalidation(&id, id.transfer_id, outcome).await?;
                return Ok(Some(DataTransferMessage::Response(response)));
            }
        }
        Ok(None)
    }

    async fn on_data_sent(&self, id: ChannelId, _link: Option<Cid>, size: u64) -> Result<()> {
        self.registry.data_sent(&id, size).await?;
        Ok(())
    }

    async fn on_channel_completed(&self, id: ChannelId, err: Option<Error>) -> Result<()> {
        if let Some(err) = err {
            let channel = self.registry.get(&id).await?;
            if channel.status != crate::status::Status::Failed {
                self.registry.error(&id, err.to_string()).await?;
            }
            return Ok(());
        }

        let channel = self.registry.get(&id).await?;
        match channel.role(&self.local_peer) {
            Role::Responder => {
                let claimed = self
                    .revalidators
                    .read()
                    .await
                    .each(|_, revalidator| match revalidator.on_complete(&id) {
                        Some(outcome) => std::ops::ControlFlow::Break(outcome),
                        None => std::ops::ControlFlow::Continue(()),
                    });
                let outcome = claimed.unwrap_or_else(|| crate::handlers::RevalidationOutcome::resume(None));
                let is_paused = matches!(outcome.decision, crate::handlers::RevalidationDecision::Paused);
                let response = message::complete_response(id.transfer_id, &outcome)?;
                self.network
                    .send_message(
                        id.other_party(&self.local_peer),
                        id.clone(),
                        DataTransferMessage::Response(response),
                    )
                    .await?;

                if is_paused {
                    self.registry.begin_finalizing(&id).await?;
                } else {
                    self.registry.complete(&id).await?;
                }
            }
            Role::Initiator => {
                self.registry.finish_transfer(&id).await?;
            }
        }
        Ok(())
    }

    async fn on_request_timed_out(&self, id: ChannelId, err: Error) -> Result<()> {
        tracing::warn!(channel = %id, error = %err, "request timed out");
        self.fail_if_not_already_failed(&id, err).await
    }

    async fn on_request_disconnected(&self, id: ChannelId, err: Error) -> Result<()> {
        tracing::warn!(channel = %id, error = %err, "peer disconnected");
        self.fail_if_not_already_failed(&id, err).await
    }

    async fn on_send_data_error(&self, id: ChannelId, err: Error) -> Result<()> {
        tracing::warn!(channel = %id, error = %err, "send failed");
        self.fail_if_not_already_failed(&id, err).await
    }
}

impl EventPipeline {
    async fn fail_if_not_already_failed(&self, id: &ChannelId, err: Error) -> Result<()> {
        let channel = self.registry.get(id).await?;
        if channel.status != crate::status::Status::Failed {
            self.registry.error(id, err.to_string()).await?;
        }
        Ok(())
    }
}

