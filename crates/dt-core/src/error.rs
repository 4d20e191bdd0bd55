use dt_protocol::ChannelId;

/// Error kinds the core distinguishes.
///
/// `Pause` and `Resume` are internal control signals for the legacy wire
/// flag derivation in `message.rs`; they are never surfaced to callers of
/// the public API (see `DESIGN.md` for why validators/revalidators return
/// [`crate::handlers::ValidationOutcome`]/[`crate::handlers::RevalidationOutcome`]
/// instead of overloading this error channel, per the source's own redesign
/// note).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("channel not found: {0}")]
    NotFound(ChannelId),

    #[error("remote rejected voucher")]
    Rejected,

    #[error("voucher type not registered: {0}")]
    UnknownType(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("already registered: {0}")]
    AlreadyRegistered(String),

    #[error("not registerable: {0}")]
    NotRegisterable(String),

    #[error("channel already exists: {0}")]
    AlreadyExists(ChannelId),
}

pub type Result<T> = std::result::Result<T, Error>;
