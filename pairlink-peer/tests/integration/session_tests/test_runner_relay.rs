use pairlink_core::{Role, Slot};
use pairlink_peer::SessionEvent;
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{
    EVENT_TIMEOUT_MS, MockExchange, MockTransportFactory, TEST_POLL_INTERVAL_MS, host_candidate,
    mock_negotiator, wait_for_event,
};

#[tokio::test]
async fn test_runners_swap_candidates_through_the_store() {
    init_tracing();
    let exchange = MockExchange::new();
    let factory = MockTransportFactory::new();
    let negotiator = mock_negotiator(&exchange, &factory);

    let (room, initiator, mut initiator_events) = negotiator.create_room().await.unwrap();
    let initiator_transport = factory.transport(Role::Initiator).await.unwrap();
    initiator_transport.gather(host_candidate(1)).await;
    initiator_transport.gather(host_candidate(2)).await;

    let (joiner, _joiner_events) = negotiator.join_room(&room).await.unwrap();
    let joiner_transport = factory.transport(Role::Joiner).await.unwrap();
    joiner_transport.gather(host_candidate(11)).await;

    wait_for_event(&mut initiator_events, EVENT_TIMEOUT_MS, |e| {
        matches!(e, SessionEvent::Negotiated)
    })
    .await
    .unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_millis(EVENT_TIMEOUT_MS);
    loop {
        let to_joiner = joiner_transport.remote_candidates().await;
        let to_initiator = initiator_transport.remote_candidates().await;
        if to_joiner.len() == 2 && to_initiator.len() == 1 {
            assert_eq!(to_joiner, vec![host_candidate(1), host_candidate(2)]);
            assert_eq!(to_initiator, vec![host_candidate(11)]);
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "Candidates not relayed: joiner has {:?}, initiator has {:?}",
            to_joiner,
            to_initiator
        );
        tokio::time::sleep(Duration::from_millis(TEST_POLL_INTERVAL_MS / 2)).await;
    }

    assert_eq!(exchange.writes_to(Slot::Candidates).await.len(), 3);

    initiator.close().await.unwrap();
    joiner.close().await.unwrap();
}

#[tokio::test]
async fn test_open_channel_stops_candidate_polling() {
    init_tracing();
    let exchange = MockExchange::new();
    let factory = MockTransportFactory::new();
    let negotiator = mock_negotiator(&exchange, &factory);

    let (room, initiator, _initiator_events) = negotiator.create_room().await.unwrap();
    let (joiner, mut joiner_events) = negotiator.join_room(&room).await.unwrap();
    let joiner_transport = factory.transport(Role::Joiner).await.unwrap();

    joiner_transport.open_channel().await;
    wait_for_event(&mut joiner_events, EVENT_TIMEOUT_MS, |e| {
        matches!(e, SessionEvent::ChannelOpen)
    })
    .await
    .unwrap();

    // Candidates showing up after the channel opened are never fetched.
    let initiator_transport = factory.transport(Role::Initiator).await.unwrap();
    initiator_transport.gather(host_candidate(7)).await;
    tokio::time::sleep(Duration::from_millis(TEST_POLL_INTERVAL_MS * 4)).await;

    assert_eq!(exchange.writes_to(Slot::Candidates).await.len(), 1);
    assert!(joiner_transport.remote_candidates().await.is_empty());

    initiator.close().await.unwrap();
    joiner.close().await.unwrap();
}
