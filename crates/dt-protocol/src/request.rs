use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::cid::{Cid, Selector};
use crate::transfer_id::TransferId;
use crate::voucher::EncodedVoucher;

/// The four mutually exclusive request shapes, carried on the wire as the
/// `Type` field. Plain pause/resume/voucher-update messages all share
/// `Update`; the `is_paused`/voucher fields disambiguate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum RequestKind {
    New = 0,
    Update = 1,
    Restart = 2,
    Cancel = 3,
}

impl RequestKind {
    fn from_wire(v: u64) -> Result<Self, WireError> {
        match v {
            0 => Ok(RequestKind::New),
            1 => Ok(RequestKind::Update),
            2 => Ok(RequestKind::Restart),
            3 => Ok(RequestKind::Cancel),
            other => Err(WireError::UnknownRequestKind(other)),
        }
    }

    fn to_wire(self) -> u64 {
        self as u64
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("unknown request kind: {0}")]
    UnknownRequestKind(u64),
    #[error("wire array has wrong arity")]
    WrongArity,
}

/// A data-transfer request, carrying `transfer_id`, flags, and the voucher
/// and graph-selection data needed to open or update a channel.
///
/// `part` is round-tripped verbatim; the legacy wire format defines it with
/// no documented meaning and neither side acts on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTransferRequest {
    pub transfer_id: TransferId,
    pub kind: RequestKind,
    pub is_pull: bool,
    pub is_paused: bool,
    pub part: bool,
    pub voucher: EncodedVoucher,
    pub base_cid: Option<Cid>,
    pub selector: Option<Selector>,
}

impl DataTransferRequest {
    pub fn is_new(&self) -> bool {
        matches!(self.kind, RequestKind::New)
    }

    pub fn is_restart(&self) -> bool {
        matches!(self.kind, RequestKind::Restart)
    }

    pub fn is_cancel(&self) -> bool {
        matches!(self.kind, RequestKind::Cancel)
    }

    pub fn is_voucher(&self) -> bool {
        matches!(self.kind, RequestKind::Update) && !self.voucher.is_empty()
    }

    pub fn new_request(
        transfer_id: TransferId,
        is_pull: bool,
        voucher: EncodedVoucher,
        base_cid: Cid,
        selector: Selector,
    ) -> Self {
        DataTransferRequest {
            transfer_id,
            kind: RequestKind::New,
            is_pull,
            is_paused: false,
            part: false,
            voucher,
            base_cid: Some(base_cid),
            selector: Some(selector),
        }
    }

    pub fn restart_request(
        transfer_id: TransferId,
        is_pull: bool,
        voucher: EncodedVoucher,
        base_cid: Cid,
        selector: Selector,
    ) -> Self {
        DataTransferRequest {
            transfer_id,
            kind: RequestKind::Restart,
            is_pull,
            is_paused: false,
            part: false,
            voucher,
            base_cid: Some(base_cid),
            selector: Some(selector),
        }
    }

    pub fn voucher_request(transfer_id: TransferId, voucher: EncodedVoucher) -> Self {
        DataTransferRequest {
            transfer_id,
            kind: RequestKind::Update,
            is_pull: false,
            is_paused: false,
            part: false,
            voucher,
            base_cid: None,
            selector: None,
        }
    }

    pub fn update_request(transfer_id: TransferId, is_paused: bool) -> Self {
        DataTransferRequest {
            transfer_id,
            kind: RequestKind::Update,
            is_pull: false,
            is_paused,
            part: false,
            voucher: EncodedVoucher::empty(),
            base_cid: None,
            selector: None,
        }
    }

    pub fn cancel_request(transfer_id: TransferId) -> Self {
        DataTransferRequest {
            transfer_id,
            kind: RequestKind::Cancel,
            is_pull: false,
            is_paused: false,
            part: false,
            voucher: EncodedVoucher::empty(),
            base_cid: None,
            selector: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Legacy fil/data-transfer/1.0 wire format: fixed 9-element ordered array.
//
// 1. BCid  2. Type  3. Paus  4. Part  5. Pull  6. Stor  7. Vouch  8. VTyp  9. XferID
// ---------------------------------------------------------------------------

/// Wraps a [`DataTransferRequest`] for the frozen 1.0 wire shape: a 9-element
/// ordered array rather than a tagged object. Preserved for backward
/// compatibility with peers still speaking `fil/data-transfer/1.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRequestV1_0(pub DataTransferRequest);

impl Serialize for LegacyRequestV1_0 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let req = &self.0;
        let mut tup = serializer.serialize_tuple(9)?;
        tup.serialize_element(&req.base_cid)?;
        tup.serialize_element(&req.kind.to_wire())?;
        tup.serialize_element(&req.is_paused)?;
        tup.serialize_element(&req.part)?;
        tup.serialize_element(&req.is_pull)?;
        tup.serialize_element(&req.selector.as_ref().map(|s| s.as_bytes().to_vec()))?;
        tup.serialize_element(&req.voucher.bytes)?;
        tup.serialize_element(req.voucher.type_id.as_str())?;
        tup.serialize_element(&req.transfer_id.0)?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for LegacyRequestV1_0 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TupleVisitor;
        impl<'de> Visitor<'de> for TupleVisitor {
            type Value = LegacyRequestV1_0;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a 9-element data-transfer request array")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let base_cid: Option<Cid> = next(&mut seq)?;
                let kind_raw: u64 = next(&mut seq)?;
                let is_paused: bool = next(&mut seq)?;
                let part: bool = next(&mut seq)?;
                let is_pull: bool = next(&mut seq)?;
                let stor: Option<Vec<u8>> = next(&mut seq)?;
                let vouch: Vec<u8> = next(&mut seq)?;
                let vtyp: String = next(&mut seq)?;
                let xfer_id: u64 = next(&mut seq)?;

                let kind = RequestKind::from_wire(kind_raw).map_err(de::Error::custom)?;
                Ok(LegacyRequestV1_0(DataTransferRequest {
                    transfer_id: TransferId(xfer_id),
                    kind,
                    is_pull,
                    is_paused,
                    part,
                    voucher: EncodedVoucher::new(vtyp.into(), vouch),
                    base_cid,
                    selector: stor.map(Selector::new),
                }))
            }
        }

        fn next<'de, A: SeqAccess<'de>, T: Deserialize<'de>>(seq: &mut A) -> Result<T, A::Error> {
            seq.next_element()?
                .ok_or_else(|| de::Error::custom("missing element in request array"))
        }

        deserializer.deserialize_tuple(9, TupleVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataTransferRequest {
        DataTransferRequest {
            transfer_id: TransferId(42),
            kind: RequestKind::New,
            is_pull: true,
            is_paused: false,
            part: false,
            voucher: EncodedVoucher::new("t".into(), vec![0xa1]),
            base_cid: Some(Cid::new(vec![0xc1])),
            selector: Some(Selector::new(vec![0xa0])),
        }
    }

    #[test]
    fn legacy_request_round_trips_as_nine_element_array() {
        let req = LegacyRequestV1_0(sample());
        let json = serde_json::to_value(&req).unwrap();
        let arr = json.as_array().expect("must serialize as an array");
        assert_eq!(arr.len(), 9);
        let back: LegacyRequestV1_0 = serde_json::from_value(json).unwrap();
        assert_eq!(back.0, req.0);
    }

    #[test]
    fn flags_derive_from_kind() {
        let mut req = sample();
        assert!(req.is_new());
        req.kind = RequestKind::Restart;
        assert!(req.is_restart());
        req.kind = RequestKind::Cancel;
        assert!(req.is_cancel());
        req.kind = RequestKind::Update;
        assert!(req.is_voucher());
        req.voucher = EncodedVoucher::empty();
        assert!(!req.is_voucher());
    }
}
