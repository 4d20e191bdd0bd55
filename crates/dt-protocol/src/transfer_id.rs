use std::fmt;

use serde::{Deserialize, Serialize};

/// A 64-bit id unique per *initiator*, minted by the transfer-id counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransferId(pub u64);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TransferId {
    fn from(v: u64) -> Self {
        TransferId(v)
    }
}
