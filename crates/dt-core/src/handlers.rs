//! Capability-set traits for application-supplied vouchers and handlers
//! (§9 "Polymorphism without inheritance"). None of these are class
//! hierarchies: each is the exact method set the Event Pipeline uses.

use std::fmt;

use dt_protocol::{Cid, ChannelId, PeerId, Selector, TypeIdentifier};

/// An opaque, application-defined authorization token attached to a channel.
pub trait Voucher: fmt::Debug + Send + Sync {
    fn type_id(&self) -> TypeIdentifier;
    fn encode(&self) -> crate::error::Result<Vec<u8>>;
}

/// An opaque, application-defined response to a voucher.
pub trait VoucherResult: fmt::Debug + Send + Sync {
    fn type_id(&self) -> TypeIdentifier;
    fn encode(&self) -> crate::error::Result<Vec<u8>>;
}

/// The outcome of validating a brand-new or restarted channel request.
///
/// The source piggybacks this decision onto `ErrPause`/a plain error
/// return (§9 "Pause/Resume as sentinel errors"). This is the redesigned,
/// explicit three-valued shape it calls for: the error channel is reserved
/// for validators that genuinely fail (panics, bugs), not for "paused" or
/// "rejected", both of which are ordinary outcomes.
#[derive(Debug)]
pub enum ValidationDecision {
    Accepted,
    Paused,
    Rejected(String),
}

#[derive(Debug)]
pub struct ValidationOutcome {
    pub decision: ValidationDecision,
    pub result: Option<Box<dyn VoucherResult>>,
}

impl ValidationOutcome {
    pub fn accepted(result: Option<Box<dyn VoucherResult>>) -> Self {
        ValidationOutcome {
            decision: ValidationDecision::Accepted,
            result,
        }
    }

    pub fn paused(result: Option<Box<dyn VoucherResult>>) -> Self {
        ValidationOutcome {
            decision: ValidationDecision::Paused,
            result,
        }
    }

    pub fn rejected(reason: impl Into<String>, result: Option<Box<dyn VoucherResult>>) -> Self {
        ValidationOutcome {
            decision: ValidationDecision::Rejected(reason.into()),
            result,
        }
    }

    /// `(accepted, is_paused)` per §4.4's flag derivation, translated from
    /// the three-valued decision instead of from `err == ErrPause`.
    pub fn response_flags(&self) -> (bool, bool) {
        match self.decision {
            ValidationDecision::Accepted => (true, false),
            ValidationDecision::Paused => (true, true),
            ValidationDecision::Rejected(_) => (false, false),
        }
    }
}

/// Validates a brand-new (or restarted) push/pull request.
pub trait RequestValidator: Send + Sync {
    fn validate_push(
        &self,
        sender: &PeerId,
        voucher: &dyn Voucher,
        base_cid: &Cid,
        selector: &Selector,
    ) -> ValidationOutcome;

    fn validate_pull(
        &self,
        receiver: &PeerId,
        voucher: &dyn Voucher,
        base_cid: &Cid,
        selector: &Selector,
    ) -> ValidationOutcome;
}

/// The outcome of mid-transfer revalidation, in the same spirit as
/// [`ValidationOutcome`] but with `Resume` in place of `Accepted`: a
/// revalidator is answering "can this paused/ongoing transfer continue?",
/// not "should this channel open at all?".
#[derive(Debug)]
pub enum RevalidationDecision {
    Resume,
    Paused,
    Rejected(String),
}

#[derive(Debug)]
pub struct RevalidationOutcome {
    pub decision: RevalidationDecision,
    pub result: Option<Box<dyn VoucherResult>>,
}

impl RevalidationOutcome {
    pub fn resume(result: Option<Box<dyn VoucherResult>>) -> Self {
        RevalidationOutcome {
            decision: RevalidationDecision::Resume,
            result,
        }
    }

    pub fn paused(result: Option<Box<dyn VoucherResult>>) -> Self {
        RevalidationOutcome {
            decision: RevalidationDecision::Paused,
            result,
        }
    }

    pub fn rejected(reason: impl Into<String>, result: Option<Box<dyn VoucherResult>>) -> Self {
        RevalidationOutcome {
            decision: RevalidationDecision::Rejected(reason.into()),
            result,
        }
    }

    pub fn response_flags(&self) -> (bool, bool) {
        match self.decision {
            RevalidationDecision::Resume => (true, false),
            RevalidationDecision::Paused => (true, true),
            RevalidationDecision::Rejected(_) => (false, false),
        }
    }
}

/// Mid-transfer revalidation and data-flow hooks. The three `on_*` hooks
/// return `None` when this revalidator does not handle the event at all —
/// `each`'s "claimed" semantics (see [`crate::handler_registry::HandlerRegistry::each`])
/// use that to move on to the next registered revalidator.
pub trait Revalidator: Send + Sync {
    fn revalidate(&self, id: &ChannelId, voucher: &dyn Voucher) -> RevalidationOutcome;

    fn on_push_data_received(&self, _id: &ChannelId, _size: u64) -> Option<RevalidationOutcome> {
        None
    }

    fn on_pull_data_sent(&self, _id: &ChannelId, _size: u64) -> Option<RevalidationOutcome> {
        None
    }

    fn on_complete(&self, _id: &ChannelId) -> Option<RevalidationOutcome> {
        None
    }
}

/// Adjusts transport knobs for a channel once its voucher type is known.
pub trait TransportConfigurer: Send + Sync {
    fn configure(&self, id: &ChannelId, voucher: &dyn Voucher);
}
