use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::transfer_id::TransferId;
use crate::voucher::EncodedVoucher;

/// A data-transfer response. All seven flags are independent — unlike
/// [`crate::request::DataTransferRequest`], a response is not modeled as a
/// single mutually-exclusive kind because `is_restart`/`is_new` can be set
/// alongside `accepted`/`is_paused` on the very same message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTransferResponse {
    pub transfer_id: TransferId,
    pub accepted: bool,
    pub is_paused: bool,
    pub is_complete: bool,
    pub is_new: bool,
    pub is_restart: bool,
    pub is_cancel: bool,
    pub voucher_result: EncodedVoucher,
}

impl DataTransferResponse {
    pub fn is_voucher_result(&self) -> bool {
        !self.voucher_result.is_empty()
    }

    pub fn empty_voucher_result(&self) -> bool {
        self.voucher_result.is_empty()
    }

    /// Flag derivation shared by the new-response, restart-response, and
    /// voucher-result-response builders: `accepted` tracks "not rejected",
    /// `is_paused` isolates the pause sentinel from every other error.
    fn flags_for(err_is_pause: bool, err_is_err: bool) -> (bool, bool) {
        let accepted = !err_is_err || err_is_pause;
        let is_paused = err_is_pause;
        (accepted, is_paused)
    }

    pub fn new_response(
        transfer_id: TransferId,
        err_is_pause: bool,
        err_is_err: bool,
        voucher_result: EncodedVoucher,
    ) -> Self {
        let (accepted, is_paused) = Self::flags_for(err_is_pause, err_is_err);
        DataTransferResponse {
            transfer_id,
            accepted,
            is_paused,
            is_complete: false,
            is_new: true,
            is_restart: false,
            is_cancel: false,
            voucher_result,
        }
    }

    pub fn restart_response(
        transfer_id: TransferId,
        err_is_pause: bool,
        err_is_err: bool,
        voucher_result: EncodedVoucher,
    ) -> Self {
        let (accepted, is_paused) = Self::flags_for(err_is_pause, err_is_err);
        DataTransferResponse {
            transfer_id,
            accepted,
            is_paused,
            is_complete: false,
            is_new: false,
            is_restart: true,
            is_cancel: false,
            voucher_result,
        }
    }

    pub fn voucher_result_response(
        transfer_id: TransferId,
        err_is_pause: bool,
        err_is_err: bool,
        voucher_result: EncodedVoucher,
    ) -> Self {
        let (accepted, is_paused) = Self::flags_for(err_is_pause, err_is_err);
        DataTransferResponse {
            transfer_id,
            accepted,
            is_paused,
            is_complete: false,
            is_new: false,
            is_restart: false,
            is_cancel: false,
            voucher_result,
        }
    }

    pub fn complete_response(
        transfer_id: TransferId,
        err_is_pause: bool,
        err_is_err: bool,
        voucher_result: EncodedVoucher,
    ) -> Self {
        let (accepted, is_paused) = Self::flags_for(err_is_pause, err_is_err);
        DataTransferResponse {
            transfer_id,
            accepted,
            is_paused,
            is_complete: true,
            is_new: false,
            is_restart: false,
            is_cancel: false,
            voucher_result,
        }
    }

    pub fn update_response(transfer_id: TransferId, is_paused: bool) -> Self {
        DataTransferResponse {
            transfer_id,
            accepted: true,
            is_paused,
            is_complete: false,
            is_new: false,
            is_restart: false,
            is_cancel: false,
            voucher_result: EncodedVoucher::empty(),
        }
    }

    pub fn cancel_response(transfer_id: TransferId) -> Self {
        DataTransferResponse {
            transfer_id,
            accepted: false,
            is_paused: false,
            is_complete: false,
            is_new: false,
            is_restart: false,
            is_cancel: true,
            voucher_result: EncodedVoucher::empty(),
        }
    }
}

// ---------------------------------------------------------------------------
// Legacy fil/data-transfer/1.0 wire format: fixed 9-element ordered array,
// analogous to the request encoding in `request.rs`.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyResponseV1_0(pub DataTransferResponse);

impl Serialize for LegacyResponseV1_0 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let resp = &self.0;
        let mut tup = serializer.serialize_tuple(9)?;
        tup.serialize_element(&resp.accepted)?;
        tup.serialize_element(&resp.is_paused)?;
        tup.serialize_element(&resp.is_complete)?;
        tup.serialize_element(&resp.is_new)?;
        tup.serialize_element(&resp.is_restart)?;
        tup.serialize_element(&resp.is_cancel)?;
        tup.serialize_element(&resp.voucher_result.bytes)?;
        tup.serialize_element(resp.voucher_result.type_id.as_str())?;
        tup.serialize_element(&resp.transfer_id.0)?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for LegacyResponseV1_0 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TupleVisitor;
        impl<'de> Visitor<'de> for TupleVisitor {
            type Value = LegacyResponseV1_0;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a 9-element data-transfer response array")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let accepted: bool = next(&mut seq)?;
                let is_paused: bool = next(&mut seq)?;
                let is_complete: bool = next(&mut seq)?;
                let is_new: bool = next(&mut seq)?;
                let is_restart: bool = next(&mut seq)?;
                let is_cancel: bool = next(&mut seq)?;
                let vres_bytes: Vec<u8> = next(&mut seq)?;
                let vres_type: String = next(&mut seq)?;
                let xfer_id: u64 = next(&mut seq)?;

                Ok(LegacyResponseV1_0(DataTransferResponse {
                    transfer_id: TransferId(xfer_id),
                    accepted,
                    is_paused,
                    is_complete,
                    is_new,
                    is_restart,
                    is_cancel,
                    voucher_result: EncodedVoucher::new(vres_type.into(), vres_bytes),
                }))
            }
        }

        fn next<'de, A: SeqAccess<'de>, T: Deserialize<'de>>(seq: &mut A) -> Result<T, A::Error> {
            seq.next_element()?
                .ok_or_else(|| de::Error::custom("missing element in response array"))
        }

        deserializer.deserialize_tuple(9, TupleVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_is_true_for_pause_sentinel() {
        let resp = DataTransferResponse::new_response(
            TransferId(1),
            true,
            true,
            EncodedVoucher::empty(),
        );
        assert!(resp.accepted);
        assert!(resp.is_paused);
    }

    #[test]
    fn accepted_is_false_for_real_errors() {
        let resp = DataTransferResponse::new_response(
            TransferId(1),
            false,
            true,
            EncodedVoucher::empty(),
        );
        assert!(!resp.accepted);
        assert!(!resp.is_paused);
    }

    #[test]
    fn legacy_response_round_trips_as_nine_element_array() {
        let resp = DataTransferResponse::complete_response(
            TransferId(99),
            false,
            false,
            EncodedVoucher::new("rt".into(), vec![9, 9]),
        );
        let wire = LegacyResponseV1_0(resp.clone());
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 9);
        let back: LegacyResponseV1_0 = serde_json::from_value(json).unwrap();
        assert_eq!(back.0, resp);
    }
}
