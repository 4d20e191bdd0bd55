//! Content identifiers and selectors.
//!
//! The core treats both as opaque byte strings: it never inspects a [`Cid`]
//! beyond equality/hashing, and never interprets a [`Selector`] beyond
//! handing it to the transport. Display/FromStr use hex so they round-trip
//! through logs and config files without surprises.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An opaque, hash-based identifier for immutable content.
///
/// Equality is byte-equality; there is no notion of "equivalent" CIDs here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cid(#[serde(with = "serde_bytes")] Vec<u8>);

impl Cid {
    pub fn new(bytes: Vec<u8>) -> Self {
        Cid(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid cid hex: {0}")]
pub struct CidParseError(#[from] hex::FromHexError);

impl FromStr for Cid {
    type Err = CidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Cid(hex::decode(s)?))
    }
}

/// An opaque description of a subgraph to traverse within a [`Cid`] root.
///
/// The core never parses this; it is round-tripped between the peer that
/// requested the transfer and the transport that actually walks the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector(#[serde(with = "serde_bytes")] Vec<u8>);

impl Selector {
    pub fn new(bytes: Vec<u8>) -> Self {
        Selector(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cid_display_and_parse_round_trip() {
        let cid = Cid::new(vec![0xde, 0xad, 0xbe, 0xef]);
        let text = cid.to_string();
        assert_eq!(text, "deadbeef");
        let parsed: Cid = text.parse().unwrap();
        assert_eq!(parsed, cid);
    }

    #[test]
    fn cid_json_round_trips_as_bytes() {
        let cid = Cid::new(vec![1, 2, 3]);
        let json = serde_json::to_string(&cid).unwrap();
        let back: Cid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cid);
    }
}
