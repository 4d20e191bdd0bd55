use std::fmt;

use serde::{Deserialize, Serialize};

use crate::peer::PeerId;
use crate::transfer_id::TransferId;

/// Identity of a transfer: `(initiator, responder, transfer_id)`.
///
/// `transfer_id` is unique per *initiator*, so the triple is globally unique
/// even though two peers can simultaneously run channels with overlapping
/// transfer ids as long as they disagree on who opened it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId {
    pub initiator: PeerId,
    pub responder: PeerId,
    pub transfer_id: TransferId,
}

impl ChannelId {
    pub fn new(initiator: PeerId, responder: PeerId, transfer_id: TransferId) -> Self {
        ChannelId {
            initiator,
            responder,
            transfer_id,
        }
    }

    /// The peer on the other end of `local`, regardless of role.
    ///
    /// Panics if `local` is neither the initiator nor the responder — that
    /// would mean the caller looked up the wrong channel.
    pub fn other_party(&self, local: &PeerId) -> &PeerId {
        if &self.initiator == local {
            &self.responder
        } else if &self.responder == local {
            &self.initiator
        } else {
            panic!("local peer {local} is not a party to channel {self}");
        }
    }

    pub fn is_initiator(&self, local: &PeerId) -> bool {
        &self.initiator == local
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.initiator, self.responder, self.transfer_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chid() -> ChannelId {
        ChannelId::new(PeerId::new("a"), PeerId::new("b"), TransferId(7))
    }

    #[test]
    fn other_party_resolves_from_either_side() {
        let id = chid();
        assert_eq!(id.other_party(&PeerId::new("a")), &PeerId::new("b"));
        assert_eq!(id.other_party(&PeerId::new("b")), &PeerId::new("a"));
    }

    #[test]
    #[should_panic]
    fn other_party_panics_for_unrelated_peer() {
        let id = chid();
        let _ = id.other_party(&PeerId::new("c"));
    }

    #[test]
    fn is_initiator_matches_the_initiator_field() {
        let id = chid();
        assert!(id.is_initiator(&PeerId::new("a")));
        assert!(!id.is_initiator(&PeerId::new("b")));
    }
}
