use std::fmt;

use serde::{Deserialize, Serialize};

/// Short string naming a voucher (or voucher result) shape.
///
/// Looked up in a handler registry to find a decoder and a processor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeIdentifier(String);

/// The type id of an absent voucher/voucher-result, e.g. on a plain cancel.
pub const EMPTY_TYPE_IDENTIFIER: &str = "";

impl TypeIdentifier {
    pub fn new(id: impl Into<String>) -> Self {
        TypeIdentifier(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeIdentifier {
    fn from(s: &str) -> Self {
        TypeIdentifier::new(s)
    }
}

impl From<String> for TypeIdentifier {
    fn from(s: String) -> Self {
        TypeIdentifier::new(s)
    }
}

impl Default for TypeIdentifier {
    fn default() -> Self {
        TypeIdentifier::new(EMPTY_TYPE_IDENTIFIER)
    }
}

/// A voucher (or voucher result) still in wire form: a type id plus the
/// opaque bytes the matching [`crate::TypeIdentifier`]'s decoder understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedVoucher {
    pub type_id: TypeIdentifier,
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

impl EncodedVoucher {
    pub fn new(type_id: TypeIdentifier, bytes: Vec<u8>) -> Self {
        EncodedVoucher { type_id, bytes }
    }

    pub fn empty() -> Self {
        EncodedVoucher {
            type_id: TypeIdentifier::default(),
            bytes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.type_id.is_empty() && self.bytes.is_empty()
    }
}
