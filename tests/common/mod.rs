//! Shared fixtures for the end-to-end scenario tests (spec §8).

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dt_core::counter::TransferIdCounter;
use dt_core::error::Result;
use dt_core::handlers::{
    RequestValidator, Revalidator, RevalidationOutcome, ValidationOutcome, Voucher, VoucherResult,
};
use dt_core::manager::Manager;
use dt_core::store::Store;
use dt_core::transport::PauseableTransport;
use dt_protocol::{Cid, ChannelId, PeerId, Selector, TypeIdentifier};
use dt_test_support::{FakeTransport, MemoryStore, Network, SequentialCounter};

pub const VOUCHER_TYPE: &str = "test-voucher";
pub const RESULT_TYPE: &str = "test-result";

#[derive(Debug, Clone)]
pub struct TestVoucher(pub String);

impl Voucher for TestVoucher {
    fn type_id(&self) -> TypeIdentifier {
        VOUCHER_TYPE.into()
    }

    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.0.clone().into_bytes())
    }
}

pub fn decode_voucher(bytes: &[u8]) -> Result<Box<dyn Voucher>> {
    Ok(Box::new(TestVoucher(String::from_utf8_lossy(bytes).into_owned())))
}

#[derive(Debug, Clone)]
pub struct TestVoucherResult(pub String);

impl VoucherResult for TestVoucherResult {
    fn type_id(&self) -> TypeIdentifier {
        RESULT_TYPE.into()
    }

    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.0.clone().into_bytes())
    }
}

pub fn decode_result(bytes: &[u8]) -> Result<Box<dyn VoucherResult>> {
    Ok(Box::new(TestVoucherResult(String::from_utf8_lossy(bytes).into_owned())))
}

/// Accepts every push/pull request outright.
pub struct AcceptAllValidator;

impl RequestValidator for AcceptAllValidator {
    fn validate_push(&self, _sender: &PeerId, _voucher: &dyn Voucher, _base_cid: &Cid, _selector: &Selector) -> ValidationOutcome {
        ValidationOutcome::accepted(None)
    }

    fn validate_pull(&self, _receiver: &PeerId, _voucher: &dyn Voucher, _base_cid: &Cid, _selector: &Selector) -> ValidationOutcome {
        ValidationOutcome::accepted(None)
    }
}

/// Pauses the channel on first sight, the way scenario 2 needs.
pub struct PauseOnAcceptValidator;

impl RequestValidator for PauseOnAcceptValidator {
    fn validate_push(&self, _sender: &PeerId, _voucher: &dyn Voucher, _base_cid: &Cid, _selector: &Selector) -> ValidationOutcome {
        ValidationOutcome::paused(None)
    }

    fn validate_pull(&self, _receiver: &PeerId, _voucher: &dyn Voucher, _base_cid: &Cid, _selector: &Selector) -> ValidationOutcome {
        ValidationOutcome::paused(None)
    }
}

/// Rejects every request with a fixed reason.
pub struct RejectingValidator(pub &'static str);

impl RequestValidator for RejectingValidator {
    fn validate_push(&self, _sender: &PeerId, _voucher: &dyn Voucher, _base_cid: &Cid, _selector: &Selector) -> ValidationOutcome {
        ValidationOutcome::rejected(self.0, None)
    }

    fn validate_pull(&self, _receiver: &PeerId, _voucher: &dyn Voucher, _base_cid: &Cid, _selector: &Selector) -> ValidationOutcome {
        ValidationOutcome::rejected(self.0, None)
    }
}

/// A revalidator that resumes the very first time it is asked — scenario
/// 2's "B's revalidator returns `nil`" (i.e. no error, resume).
pub struct ResumeRevalidator;

impl Revalidator for ResumeRevalidator {
    fn revalidate(&self, _id: &ChannelId, _voucher: &dyn Voucher) -> RevalidationOutcome {
        RevalidationOutcome::resume(None)
    }
}

/// A revalidator that pauses on `on_complete` exactly once, then resumes —
/// scenario 5's two-phase finalization handshake.
pub struct PauseOnceOnCompleteRevalidator {
    already_paused: AtomicBool,
}

impl PauseOnceOnCompleteRevalidator {
    pub fn new() -> Self {
        PauseOnceOnCompleteRevalidator {
            already_paused: AtomicBool::new(false),
        }
    }
}

impl Revalidator for PauseOnceOnCompleteRevalidator {
    fn revalidate(&self, _id: &ChannelId, _voucher: &dyn Voucher) -> RevalidationOutcome {
        RevalidationOutcome::resume(None)
    }

    fn on_complete(&self, _id: &ChannelId) -> Option<RevalidationOutcome> {
        if self.already_paused.swap(true, Ordering::SeqCst) {
            Some(RevalidationOutcome::resume(None))
        } else {
            Some(RevalidationOutcome::paused(None))
        }
    }
}

pub struct Peer {
    pub id: PeerId,
    pub manager: Arc<Manager>,
    pub transport: Arc<FakeTransport>,
}

/// Wires up two in-process peers sharing a [`Network`] and a pair of
/// connected [`FakeTransport`]s, each with its own [`MemoryStore`] and
/// [`SequentialCounter`].
pub async fn peer_pair() -> (Peer, Peer) {
    let a_id = PeerId::new("peer-a");
    let b_id = PeerId::new("peer-b");

    let network_a = Network::new(a_id.clone());
    let network_b = Network::new(b_id.clone());
    Network::connect(&network_a, &network_b);

    let transport_a = FakeTransport::new(network_a.clone());
    let transport_b = FakeTransport::new(network_b.clone());

    let manager_a = Manager::new(
        a_id.clone(),
        Arc::new(MemoryStore::new()) as Arc<dyn Store>,
        network_a,
        transport_a.clone(),
        Some(transport_a.clone() as Arc<dyn PauseableTransport>),
        Arc::new(SequentialCounter::new()) as Arc<dyn TransferIdCounter>,
    )
    .await
    .expect("manager a wires up");

    let manager_b = Manager::new(
        b_id.clone(),
        Arc::new(MemoryStore::new()) as Arc<dyn Store>,
        network_b,
        transport_b.clone(),
        Some(transport_b.clone() as Arc<dyn PauseableTransport>),
        Arc::new(SequentialCounter::new()) as Arc<dyn TransferIdCounter>,
    )
    .await
    .expect("manager b wires up");

    (
        Peer { id: a_id, manager: manager_a, transport: transport_a },
        Peer { id: b_id, manager: manager_b, transport: transport_b },
    )
}
