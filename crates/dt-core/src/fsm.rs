//! The channel state machine: §4.1's transition table, applied atomically.

use dt_protocol::EncodedVoucher;

use crate::channel::Channel;
use crate::event::Event;
use crate::status::Status;

/// Applies `event` to `channel`, mutating it in place per the transition
/// table. Every event either fully applies (status change plus action) or
/// is a no-op; there is no partial-application case.
///
/// A channel already in a terminal state (`Cancelled`, `Completed`,
/// `Failed`) accepts only events whose table entry is a true self-loop from
/// that exact status; every other event, including ones with a `FromAny`
/// clause, is rejected wholesale — no status change, no counter bump, no
/// voucher append. This is what makes `apply(Cancel); apply(Cancel)` an
/// idempotent no-op instead of re-running `Cancel`'s `FromAny` clause from
/// `Completed`, and is what §8's P4 ("after a terminal state, no event
/// changes status further") actually requires.
pub fn apply(channel: &mut Channel, event: Event) {
    if channel.status.is_terminal() && target_status(channel.status, &event) != channel.status {
        return;
    }
    apply_unchecked(channel, event);
}

/// The status `event` would produce from `current`, per the transition
/// table, ignoring the terminal-state guard. Kept free of side effects so
/// [`apply`] can consult it before committing to a mutation.
fn target_status(current: Status, event: &Event) -> Status {
    use Status::*;

    match event {
        Event::Open => Requested,
        Event::Accept => {
            if current == Requested {
                Ongoing
            } else {
                current
            }
        }
        Event::Restart => {
            if current.is_terminal() {
                current
            } else {
                Ongoing
            }
        }
        Event::Cancel => Cancelled,
        Event::Progress { .. } => current,
        Event::Error(_) => Failed,
        Event::NewVoucher { .. } | Event::NewVoucherResult { .. } => current,
        Event::PauseInitiator => match current {
            Requested | Ongoing => InitiatorPaused,
            ResponderPaused => BothPaused,
            other => other,
        },
        Event::PauseResponder => match current {
            Requested | Ongoing => ResponderPaused,
            InitiatorPaused => BothPaused,
            other => other,
        },
        Event::ResumeInitiator => match current {
            InitiatorPaused => Ongoing,
            BothPaused => ResponderPaused,
            other => other,
        },
        Event::ResumeResponder => match current {
            ResponderPaused => Ongoing,
            BothPaused => InitiatorPaused,
            Finalizing => Completed,
            ResponderFinalizing => ResponderCompleted,
            ResponderFinalizingTransferFinished => Completed,
            other => other,
        },
        Event::FinishTransfer => match current {
            ResponderCompleted => Completed,
            ResponderFinalizing => ResponderFinalizingTransferFinished,
            _ => TransferFinished,
        },
        Event::ResponderBeginsFinalization => match current {
            TransferFinished => ResponderFinalizingTransferFinished,
            _ => ResponderFinalizing,
        },
        Event::ResponderCompletes => match current {
            ResponderPaused => ResponderFinalizing,
            TransferFinished => Completed,
            _ => ResponderCompleted,
        },
        Event::BeginFinalizing => Finalizing,
        Event::Complete => Completed,
    }
}

fn apply_unchecked(channel: &mut Channel, event: Event) {
    use Status::*;

    match event {
        Event::Open => {
            channel.status = Requested;
        }

        Event::Accept => {
            if channel.status == Requested {
                channel.status = Ongoing;
            }
        }

        Event::Restart => {
            if !channel.status.is_terminal() {
                channel.status = Ongoing;
            }
        }

        Event::Cancel => {
            channel.status = Cancelled;
        }

        Event::Progress {
            delta_sent,
            delta_received,
        } => {
            if matches!(
                channel.status,
                Ongoing | InitiatorPaused | ResponderPaused | BothPaused | ResponderCompleted
                    | ResponderFinalizing
            ) {
                channel.sent += delta_sent;
                channel.received += delta_received;
            }
        }

        Event::Error(message) => {
            channel.status = Failed;
            channel.message = message;
        }

        Event::NewVoucher { type_id, bytes } => {
            channel.vouchers.push(EncodedVoucher::new(type_id, bytes));
        }

        Event::NewVoucherResult { type_id, bytes } => {
            channel
                .voucher_results
                .push(EncodedVoucher::new(type_id, bytes));
        }

        Event::PauseInitiator => {
            channel.status = match channel.status {
                Requested | Ongoing => InitiatorPaused,
                ResponderPaused => BothPaused,
                other => other,
            };
        }

        Event::PauseResponder => {
            channel.status = match channel.status {
                Requested | Ongoing => ResponderPaused,
                InitiatorPaused => BothPaused,
                other => other,
            };
        }

        Event::ResumeInitiator => {
            channel.status = match channel.status {
                InitiatorPaused => Ongoing,
                BothPaused => ResponderPaused,
                other => other,
            };
        }

        Event::ResumeResponder => {
            channel.status = match channel.status {
                ResponderPaused => Ongoing,
                BothPaused => InitiatorPaused,
                Finalizing => Completed,
                ResponderFinalizing => ResponderCompleted,
                ResponderFinalizingTransferFinished => Completed,
                other => other,
            };
        }

        Event::FinishTransfer => {
            channel.status = match channel.status {
                ResponderCompleted => Completed,
                ResponderFinalizing => ResponderFinalizingTransferFinished,
                _ => TransferFinished,
            };
        }

        Event::ResponderBeginsFinalization => {
            channel.status = match channel.status {
                TransferFinished => ResponderFinalizingTransferFinished,
                _ => ResponderFinalizing,
            };
        }

        Event::ResponderCompletes => {
            channel.status = match channel.status {
                ResponderPaused => ResponderFinalizing,
                TransferFinished => Completed,
                _ => ResponderCompleted,
            };
        }

        Event::BeginFinalizing => {
            channel.status = Finalizing;
        }

        Event::Complete => {
            channel.status = Completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_protocol::{Cid, ChannelId, PeerId, Selector, TransferId};

    fn fresh() -> Channel {
        Channel::new(
            ChannelId::new(PeerId::new("a"), PeerId::new("b"), TransferId(1)),
            Cid::new(vec![1]),
            Selector::new(vec![2]),
            PeerId::new("a"),
            PeerId::new("b"),
            EncodedVoucher::new("t".into(), vec![0x01]),
        )
    }

    #[test]
    fn open_then_accept_reaches_ongoing() {
        let mut ch = fresh();
        apply(&mut ch, Event::Open);
        assert_eq!(ch.status, Status::Requested);
        apply(&mut ch, Event::Accept);
        assert_eq!(ch.status, Status::Ongoing);
    }

    #[test]
    fn accept_on_ongoing_is_a_noop() {
        let mut ch = fresh();
        ch.status = Status::Ongoing;
        apply(&mut ch, Event::Accept);
        assert_eq!(ch.status, Status::Ongoing);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut ch = fresh();
        ch.status = Status::Ongoing;
        apply(&mut ch, Event::Cancel);
        assert_eq!(ch.status, Status::Cancelled);
        apply(&mut ch, Event::Cancel);
        assert_eq!(ch.status, Status::Cancelled);
    }

    #[test]
    fn pause_both_sides_reaches_both_paused_order_independent() {
        let mut a = fresh();
        a.status = Status::Ongoing;
        apply(&mut a, Event::PauseInitiator);
        apply(&mut a, Event::PauseResponder);
        assert_eq!(a.status, Status::BothPaused);

        let mut b = fresh();
        b.status = Status::Ongoing;
        apply(&mut b, Event::PauseResponder);
        apply(&mut b, Event::PauseInitiator);
        assert_eq!(b.status, Status::BothPaused);
    }

    #[test]
    fn pause_then_resume_initiator_returns_to_ongoing() {
        let mut ch = fresh();
        ch.status = Status::Ongoing;
        apply(&mut ch, Event::PauseInitiator);
        apply(&mut ch, Event::ResumeInitiator);
        assert_eq!(ch.status, Status::Ongoing);
    }

    #[test]
    fn progress_accumulates_only_in_active_states() {
        let mut ch = fresh();
        ch.status = Status::Ongoing;
        apply(
            &mut ch,
            Event::Progress {
                delta_sent: 100,
                delta_received: 0,
            },
        );
        assert_eq!(ch.sent, 100);

        ch.status = Status::Completed;
        apply(
            &mut ch,
            Event::Progress {
                delta_sent: 50,
                delta_received: 0,
            },
        );
        assert_eq!(ch.sent, 100, "progress on a terminal channel is rejected");
    }

    #[test]
    fn new_voucher_appends_regardless_of_status() {
        let mut ch = fresh();
        assert_eq!(ch.vouchers.len(), 1);
        apply(
            &mut ch,
            Event::NewVoucher {
                type_id: "t2".into(),
                bytes: vec![0x02],
            },
        );
        assert_eq!(ch.vouchers.len(), 2);
    }

    #[test]
    fn two_phase_finalization_handshake() {
        let mut initiator = fresh();
        initiator.status = Status::Ongoing;
        apply(&mut initiator, Event::FinishTransfer);
        assert_eq!(initiator.status, Status::TransferFinished);

        let mut responder = fresh();
        responder.status = Status::Ongoing;
        apply(&mut responder, Event::ResponderBeginsFinalization);
        assert_eq!(responder.status, Status::ResponderFinalizing);

        apply(&mut initiator, Event::ResponderBeginsFinalization);
        assert_eq!(initiator.status, Status::ResponderFinalizingTransferFinished);
        apply(&mut initiator, Event::ResumeResponder);
        assert_eq!(initiator.status, Status::Completed);
    }

    #[test]
    fn error_on_a_different_terminal_status_is_rejected() {
        let mut ch = fresh();
        ch.status = Status::Completed;
        apply(&mut ch, Event::Error("boom".into()));
        assert_eq!(
            ch.status,
            Status::Completed,
            "a terminal channel only accepts self-loop events"
        );
    }

    #[test]
    fn cancel_on_a_different_terminal_status_is_rejected() {
        let mut ch = fresh();
        ch.status = Status::Completed;
        apply(&mut ch, Event::Cancel);
        assert_eq!(ch.status, Status::Completed);
    }

    #[test]
    fn progress_is_rejected_once_terminal() {
        let mut ch = fresh();
        ch.status = Status::Cancelled;
        apply(
            &mut ch,
            Event::Progress {
                delta_sent: 10,
                delta_received: 0,
            },
        );
        assert_eq!(ch.sent, 0, "progress on a terminal channel is rejected");
    }
}
