use std::fmt;

use dt_protocol::TypeIdentifier;

/// A state-machine event. Mirrors the transition table in §4.1: each
/// variant is either unconditionally applied (`Open`, `Cancel`, `Error`,
/// `BeginFinalizing`, `Complete`) or matched against the current [`crate::Status`]
/// by [`crate::fsm::apply`].
#[derive(Debug, Clone)]
pub enum Event {
    Open,
    Accept,
    /// Applied in place of `Accept` when a restart request lands on an
    /// existing channel rather than a brand-new one.
    Restart,
    Cancel,
    Progress { delta_sent: u64, delta_received: u64 },
    Error(String),
    NewVoucher { type_id: TypeIdentifier, bytes: Vec<u8> },
    NewVoucherResult { type_id: TypeIdentifier, bytes: Vec<u8> },
    PauseInitiator,
    PauseResponder,
    ResumeInitiator,
    ResumeResponder,
    FinishTransfer,
    ResponderBeginsFinalization,
    ResponderCompletes,
    BeginFinalizing,
    Complete,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Open => write!(f, "Open"),
            Event::Accept => write!(f, "Accept"),
            Event::Restart => write!(f, "Restart"),
            Event::Cancel => write!(f, "Cancel"),
            Event::Progress { .. } => write!(f, "Progress"),
            Event::Error(_) => write!(f, "Error"),
            Event::NewVoucher { .. } => write!(f, "NewVoucher"),
            Event::NewVoucherResult { .. } => write!(f, "NewVoucherResult"),
            Event::PauseInitiator => write!(f, "PauseInitiator"),
            Event::PauseResponder => write!(f, "PauseResponder"),
            Event::ResumeInitiator => write!(f, "ResumeInitiator"),
            Event::ResumeResponder => write!(f, "ResumeResponder"),
            Event::FinishTransfer => write!(f, "FinishTransfer"),
            Event::ResponderBeginsFinalization => write!(f, "ResponderBeginsFinalization"),
            Event::ResponderCompletes => write!(f, "ResponderCompletes"),
            Event::BeginFinalizing => write!(f, "BeginFinalizing"),
            Event::Complete => write!(f, "Complete"),
        }
    }
}
