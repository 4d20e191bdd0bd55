//! Spec §8 scenario 3: the responder cancels mid-transfer.

mod common;

use std::sync::{Arc, Mutex};

use dt_core::event::Event;
use dt_core::handlers::Voucher;
use dt_core::status::Status;
use dt_protocol::{Cid, EncodedVoucher, Selector};

use common::{decode_voucher, peer_pair, AcceptAllValidator, TestVoucher, VOUCHER_TYPE};

#[tokio::test]
async fn responder_cancel_stops_the_channel_on_both_sides() {
    let (a, b) = peer_pair().await;

    b.manager
        .register_voucher_type(
            VOUCHER_TYPE.into(),
            Arc::new(decode_voucher),
            Arc::new(AcceptAllValidator),
        )
        .await
        .expect("register voucher type");

    let cancels_seen = Arc::new(Mutex::new(0u32));
    let counter = cancels_seen.clone();
    a.manager.subscribe(Arc::new(move |event, _channel| {
        if matches!(event, Event::Cancel) {
            *counter.lock().unwrap() += 1;
        }
    }));

    let voucher = EncodedVoucher::new(VOUCHER_TYPE.into(), TestVoucher("V".into()).encode().unwrap());
    let id = a
        .manager
        .open_push(b.id.clone(), voucher, Cid::new(b"cid1".to_vec()), Selector::new(b"s".to_vec()))
        .await
        .expect("open_push");

    for size in [100u64, 100] {
        a.transport.simulate_block_sent(&id, None, size).await.unwrap();
        b.transport.simulate_block_received(&id, None, size).await.unwrap();
    }

    b.manager.close(&id).await.expect("close cancels the channel");

    assert_eq!(a.manager.status(&id).await.unwrap(), Status::Cancelled);
    assert_eq!(b.manager.status(&id).await.unwrap(), Status::Cancelled);
    assert_eq!(*cancels_seen.lock().unwrap(), 1);

    // Cancelled is terminal: further progress events are silent no-ops (P4).
    a.transport.simulate_block_sent(&id, None, 9999).await.unwrap();
    let a_chan = a.manager.get(&id).await.unwrap();
    assert_eq!(a_chan.sent, 200);
    assert_eq!(a_chan.status, Status::Cancelled);
}
