//! Spec §8 scenario 4: B's validator rejects A's push outright.

mod common;

use std::sync::Arc;

use dt_core::handlers::Voucher;
use dt_core::status::Status;
use dt_protocol::{Cid, EncodedVoucher, Selector};

use common::{decode_voucher, peer_pair, RejectingValidator, TestVoucher, VOUCHER_TYPE};

#[tokio::test]
async fn rejected_push_fails_both_channels() {
    let (a, b) = peer_pair().await;

    b.manager
        .register_voucher_type(
            VOUCHER_TYPE.into(),
            Arc::new(decode_voucher),
            Arc::new(RejectingValidator("not on the list")),
        )
        .await
        .expect("register voucher type");

    let voucher = EncodedVoucher::new(VOUCHER_TYPE.into(), TestVoucher("V".into()).encode().unwrap());
    let id = a
        .manager
        .open_push(b.id.clone(), voucher, Cid::new(b"cid1".to_vec()), Selector::new(b"s".to_vec()))
        .await
        .expect("open_push");

    let a_chan = a.manager.get(&id).await.unwrap();
    let b_chan = b.manager.get(&id).await.unwrap();

    assert_eq!(a_chan.status, Status::Failed);
    assert_eq!(b_chan.status, Status::Failed);
    assert_eq!(b_chan.message, "not on the list");
}
