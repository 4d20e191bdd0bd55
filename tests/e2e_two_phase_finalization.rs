//! Spec §8 scenario 5: the responder still has work after the initiator
//! has received everything, so finalization is a two-step handshake.

mod common;

use std::sync::Arc;

use dt_core::handlers::Voucher;
use dt_core::status::Status;
use dt_protocol::{Cid, EncodedVoucher, Selector};

use common::{decode_voucher, peer_pair, AcceptAllValidator, PauseOnceOnCompleteRevalidator, TestVoucher, VOUCHER_TYPE};

#[tokio::test]
async fn initiator_finishes_receiving_before_responder_finishes_its_own_work() {
    let (a, b) = peer_pair().await;

    b.manager
        .register_voucher_type(
            VOUCHER_TYPE.into(),
            Arc::new(decode_voucher),
            Arc::new(AcceptAllValidator),
        )
        .await
        .expect("register voucher type");
    b.manager
        .register_revalidator(
            VOUCHER_TYPE.into(),
            Arc::new(decode_voucher),
            Arc::new(PauseOnceOnCompleteRevalidator::new()),
        )
        .await
        .expect("register revalidator");

    // Pull: A is initiator/receiver, B is responder/sender.
    let voucher = EncodedVoucher::new(VOUCHER_TYPE.into(), TestVoucher("V".into()).encode().unwrap());
    let id = a
        .manager
        .open_pull(b.id.clone(), voucher, Cid::new(b"cid1".to_vec()), Selector::new(b"s".to_vec()))
        .await
        .expect("open_pull");

    assert_eq!(a.manager.status(&id).await.unwrap(), Status::Ongoing);
    assert_eq!(b.manager.status(&id).await.unwrap(), Status::Ongoing);

    b.transport.simulate_block_sent(&id, None, 500).await.unwrap();
    a.transport.simulate_block_received(&id, None, 500).await.unwrap();

    // A has everything it asked for.
    a.transport.simulate_channel_completed(&id, None).await.unwrap();
    assert_eq!(a.manager.status(&id).await.unwrap(), Status::TransferFinished);

    // B's own transport reports done, but its revalidator wants to pause
    // once (e.g. to finish paying out) before it calls itself complete.
    b.transport.simulate_channel_completed(&id, None).await.unwrap();
    assert_eq!(b.manager.status(&id).await.unwrap(), Status::Finalizing);
    assert_eq!(a.manager.status(&id).await.unwrap(), Status::ResponderFinalizingTransferFinished);

    // B finishes its remaining work and unpauses itself — the public
    // resume operation is the "ResumeResponder-equivalent signal" the
    // initiator is waiting on.
    b.manager.resume(&id).await.expect("resume");

    assert_eq!(b.manager.status(&id).await.unwrap(), Status::Completed);
    assert_eq!(a.manager.status(&id).await.unwrap(), Status::Completed);
}
