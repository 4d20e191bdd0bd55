//! dt-protocol: wire types for the data-transfer protocol.
//!
//! Two protocol versions coexist on the wire: the legacy, frozen
//! `fil/data-transfer/1.0` array encoding (see [`request::LegacyRequestV1_0`]
//! / [`response::LegacyResponseV1_0`]), and the current tagged-object
//! `fil/data-transfer/1.1` encoding, which is just the plain derived
//! `Serialize`/`Deserialize` impl on [`DataTransferRequest`] /
//! [`DataTransferResponse`].

pub mod channel_id;
pub mod cid;
pub mod peer;
pub mod request;
pub mod response;
pub mod transfer_id;
pub mod voucher;

pub use channel_id::ChannelId;
pub use cid::{Cid, Selector};
pub use peer::PeerId;
pub use request::{DataTransferRequest, LegacyRequestV1_0, RequestKind, WireError};
pub use response::{DataTransferResponse, LegacyResponseV1_0};
pub use transfer_id::TransferId;
pub use voucher::{EncodedVoucher, TypeIdentifier, EMPTY_TYPE_IDENTIFIER};

/// Identifies the underlying block-transport extension carrying 1.1
/// messages (see `transport::Transport` in `dt-core`).
pub const EXTENSION_DATA_TRANSFER_1_1: &str = "fil/data-transfer/1.1";
/// Identifies the legacy extension carrying 1.0 messages.
pub const EXTENSION_DATA_TRANSFER_1_0: &str = "fil/data-transfer";

/// The two coexisting protocol versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    V1_0,
    V1_1,
}
