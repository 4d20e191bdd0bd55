//! Spec §8 scenario 1: push happy path, 3 blocks, both sides complete.

mod common;

use std::sync::Arc;

use dt_core::handlers::Voucher;
use dt_core::status::Status;
use dt_protocol::{Cid, EncodedVoucher, Selector};

use common::{decode_voucher, peer_pair, AcceptAllValidator, TestVoucher, VOUCHER_TYPE};

#[tokio::test]
async fn push_delivers_three_blocks_and_both_sides_complete() {
    let (a, b) = peer_pair().await;

    b.manager
        .register_voucher_type(
            VOUCHER_TYPE.into(),
            Arc::new(decode_voucher),
            Arc::new(AcceptAllValidator),
        )
        .await
        .expect("register voucher type");

    let voucher = EncodedVoucher::new(VOUCHER_TYPE.into(), TestVoucher("V".into()).encode().unwrap());
    let id = a
        .manager
        .open_push(b.id.clone(), voucher, Cid::new(b"cid1".to_vec()), Selector::new(b"s".to_vec()))
        .await
        .expect("open_push");

    assert_eq!(a.manager.status(&id).await.unwrap(), Status::Ongoing);
    assert_eq!(b.manager.status(&id).await.unwrap(), Status::Ongoing);

    for size in [100u64, 200, 300] {
        a.transport.simulate_block_sent(&id, None, size).await.unwrap();
        b.transport.simulate_block_received(&id, None, size).await.unwrap();
    }

    a.transport.simulate_channel_completed(&id, None).await.unwrap();
    b.transport.simulate_channel_completed(&id, None).await.unwrap();

    let a_chan = a.manager.get(&id).await.unwrap();
    let b_chan = b.manager.get(&id).await.unwrap();

    assert_eq!(a_chan.status, Status::Completed);
    assert_eq!(a_chan.sent, 600);
    assert_eq!(b_chan.status, Status::Completed);
    assert_eq!(b_chan.received, 600);
}
