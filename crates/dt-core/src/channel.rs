use serde::{Deserialize, Serialize};

use dt_protocol::{Cid, ChannelId, EncodedVoucher, PeerId, Selector, TypeIdentifier};

use crate::status::Status;

/// Whether the local peer is the one that opened the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

/// The persisted state of one transfer (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub base_cid: Cid,
    pub selector: Selector,
    pub sender: PeerId,
    pub receiver: PeerId,
    pub status: Status,
    pub sent: u64,
    pub received: u64,
    /// Last error/status text; empty if none.
    pub message: String,
    /// Append-only; index 0 is the initial voucher.
    pub vouchers: Vec<EncodedVoucher>,
    pub voucher_results: Vec<EncodedVoucher>,
}

impl Channel {
    pub fn new(
        id: ChannelId,
        base_cid: Cid,
        selector: Selector,
        sender: PeerId,
        receiver: PeerId,
        initial_voucher: EncodedVoucher,
    ) -> Self {
        Channel {
            id,
            base_cid,
            selector,
            sender,
            receiver,
            status: Status::Requested,
            sent: 0,
            received: 0,
            message: String::new(),
            vouchers: vec![initial_voucher],
            voucher_results: Vec::new(),
        }
    }

    pub fn role(&self, local: &PeerId) -> Role {
        if self.id.is_initiator(local) {
            Role::Initiator
        } else {
            Role::Responder
        }
    }

    pub fn is_sender(&self, local: &PeerId) -> bool {
        &self.sender == local
    }

    pub fn latest_voucher_type(&self) -> TypeIdentifier {
        self.vouchers
            .last()
            .map(|v| v.type_id.clone())
            .unwrap_or_default()
    }
}
