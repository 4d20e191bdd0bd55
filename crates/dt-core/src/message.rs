//! Message Builder/Parser (§4.4): the five request/response shapes, built
//! with the correct flags for every situation the Event Pipeline hits.

use dt_protocol::{Cid, DataTransferRequest, DataTransferResponse, EncodedVoucher, Selector, TransferId};

use crate::handlers::{RevalidationOutcome, ValidationOutcome};

#[derive(Debug, Clone)]
pub enum DataTransferMessage {
    Request(DataTransferRequest),
    Response(DataTransferResponse),
}

fn encode(voucher: &dyn crate::handlers::VoucherResult) -> crate::error::Result<EncodedVoucher> {
    Ok(EncodedVoucher::new(voucher.type_id(), voucher.encode()?))
}

fn encode_opt(
    voucher: Option<&dyn crate::handlers::VoucherResult>,
) -> crate::error::Result<EncodedVoucher> {
    match voucher {
        Some(v) => encode(v),
        None => Ok(EncodedVoucher::empty()),
    }
}

pub fn new_request(
    transfer_id: TransferId,
    is_pull: bool,
    voucher: EncodedVoucher,
    base_cid: Cid,
    selector: Selector,
) -> DataTransferRequest {
    DataTransferRequest::new_request(transfer_id, is_pull, voucher, base_cid, selector)
}

pub fn restart_request(
    transfer_id: TransferId,
    is_pull: bool,
    voucher: EncodedVoucher,
    base_cid: Cid,
    selector: Selector,
) -> DataTransferRequest {
    DataTransferRequest::restart_request(transfer_id, is_pull, voucher, base_cid, selector)
}

pub fn voucher_update_request(transfer_id: TransferId, voucher: EncodedVoucher) -> DataTransferRequest {
    DataTransferRequest::voucher_request(transfer_id, voucher)
}

pub fn pause_resume_request(transfer_id: TransferId, is_paused: bool) -> DataTransferRequest {
    DataTransferRequest::update_request(transfer_id, is_paused)
}

pub fn cancel_request(transfer_id: TransferId) -> DataTransferRequest {
    DataTransferRequest::cancel_request(transfer_id)
}

/// Response to a brand-new (or restarted) channel request, built from a
/// [`ValidationOutcome`] rather than the source's `err == ErrPause` check.
pub fn response_for_validation(
    transfer_id: TransferId,
    is_new: bool,
    outcome: &ValidationOutcome,
) -> crate::error::Result<DataTransferResponse> {
    let (accepted, is_paused) = outcome.response_flags();
    let voucher_result = encode_opt(outcome.result.as_deref())?;
    Ok(if is_new {
        DataTransferResponse::new_response(transfer_id, is_paused, !accepted, voucher_result)
    } else {
        DataTransferResponse::restart_response(transfer_id, is_paused, !accepted, voucher_result)
    })
}

/// Response to a voucher revalidation, built from a [`RevalidationOutcome`].
/// Callers pick between `VoucherResultResponse` and `CompleteResponse`
/// themselves, per §4.5's "if current status is Finalizing, use
/// CompleteResponse" rule.
pub fn voucher_result_response(
    transfer_id: TransferId,
    outcome: &RevalidationOutcome,
) -> crate::error::Result<DataTransferResponse> {
    let (accepted, is_paused) = outcome.response_flags();
    let voucher_result = encode_opt(outcome.result.as_deref())?;
    Ok(DataTransferResponse::voucher_result_response(
        transfer_id,
        is_paused,
        !accepted,
        voucher_result,
    ))
}

pub fn complete_response(
    transfer_id: TransferId,
    outcome: &RevalidationOutcome,
) -> crate::error::Result<DataTransferResponse> {
    let (accepted, is_paused) = outcome.response_flags();
    let voucher_result = encode_opt(outcome.result.as_deref())?;
    Ok(DataTransferResponse::complete_response(
        transfer_id,
        is_paused,
        !accepted,
        voucher_result,
    ))
}

pub fn pause_resume_response(transfer_id: TransferId, is_paused: bool) -> DataTransferResponse {
    DataTransferResponse::update_response(transfer_id, is_paused)
}

pub fn cancel_response(transfer_id: TransferId) -> DataTransferResponse {
    DataTransferResponse::cancel_response(transfer_id)
}
