use serde::{Deserialize, Serialize};
use std::fmt;

/// The fourteen states a channel can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Requested,
    Ongoing,
    InitiatorPaused,
    ResponderPaused,
    BothPaused,
    TransferFinished,
    Finalizing,
    ResponderFinalizing,
    ResponderCompleted,
    ResponderFinalizingTransferFinished,
    Completed,
    Cancelled,
    Failed,
    Failing,
}

impl Status {
    /// Channels in a terminal state never leave it: `apply` only ever
    /// idempotently replays or silently drops events against them.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Cancelled | Status::Completed | Status::Failed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
