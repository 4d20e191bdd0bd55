//! A peer-to-peer data-transfer protocol manager: a channel state machine
//! plus the event dispatcher that drives it from network and transport
//! callbacks.
//!
//! This crate is a thin façade over [`dt_core`] and [`dt_protocol`] — it
//! re-exports the pieces an embedding application needs and adds
//! `init_tracing` for wiring up logging the way the rest of this project's
//! services do. The state machine, registries, and event pipeline live in
//! `dt-core`; the wire types (`Cid`, `Selector`, requests/responses) live in
//! `dt-protocol`.

use tracing_subscriber::EnvFilter;

pub use dt_core::channel::{Channel, Role};
pub use dt_core::counter::TransferIdCounter;
pub use dt_core::error::{Error, Result};
pub use dt_core::event::Event;
pub use dt_core::handlers::{
    RequestValidator, Revalidator, RevalidationDecision, RevalidationOutcome, TransportConfigurer,
    ValidationDecision, ValidationOutcome, Voucher, VoucherResult,
};
pub use dt_core::manager::Manager;
pub use dt_core::network::{DataTransferNetwork, NetworkReceiver};
pub use dt_core::notifier::{Notifier, Subscriber, SubscriptionId};
pub use dt_core::registry::ChannelRegistry;
pub use dt_core::status::Status;
pub use dt_core::store::Store;
pub use dt_core::transport::{PauseableTransport, Transport, TransportEventHandler};

pub use dt_protocol::{
    Cid, ChannelId, DataTransferRequest, DataTransferResponse, EncodedVoucher, PeerId, Selector,
    TransferId, TypeIdentifier,
};

/// Initializes `tracing-subscriber` from the `LOG_LEVEL` environment
/// variable (defaulting to `info`), matching how this project's own
/// services bring up logging.
pub fn init_tracing() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .init();
}
