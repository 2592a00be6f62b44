use pairlink_core::{CandidateRecord, Entry, Role, RoomId, SessionDescription};
use pairlink_peer::{CandidateRelay, Exchange, ExchangeError};
use std::sync::Arc;

use crate::integration::init_tracing;
use crate::utils::{MockExchange, host_candidate};

async fn open_room(exchange: &MockExchange, room: &RoomId) {
    exchange
        .put(room, Entry::Description(SessionDescription::offer("v=0")))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_local_candidates_are_published_in_order() {
    init_tracing();
    let exchange = MockExchange::new();
    let room = RoomId::from("local0001");
    open_room(&exchange, &room).await;

    let mut relay = CandidateRelay::new(room.clone(), Role::Joiner, Arc::new(exchange.clone()));
    for n in 1..=3 {
        relay.on_local_candidate_discovered(host_candidate(n)).await.unwrap();
    }

    let sequence = exchange.candidates_since(&room, 0).await.unwrap();
    assert_eq!(
        sequence,
        (1..=3)
            .map(|n| CandidateRecord::new(Role::Joiner, host_candidate(n)))
            .collect::<Vec<_>>()
    );
    assert_eq!(relay.pending(), 0);
}

#[tokio::test]
async fn test_failed_publish_is_retried_in_order() {
    init_tracing();
    let exchange = MockExchange::new();
    let room = RoomId::from("local0002");
    open_room(&exchange, &room).await;

    let mut relay = CandidateRelay::new(room.clone(), Role::Initiator, Arc::new(exchange.clone()));

    exchange.fail_next(1).await;
    let first = relay.on_local_candidate_discovered(host_candidate(1)).await;
    assert!(matches!(first, Err(ExchangeError::Unavailable(_))));
    assert_eq!(relay.pending(), 1);

    relay.on_local_candidate_discovered(host_candidate(2)).await.unwrap();
    assert_eq!(relay.pending(), 0);

    let sequence = exchange.candidates_since(&room, 0).await.unwrap();
    let published: Vec<_> = sequence.into_iter().map(|r| r.candidate).collect();
    assert_eq!(published, vec![host_candidate(1), host_candidate(2)]);
}

#[tokio::test]
async fn test_full_room_drops_the_candidate() {
    init_tracing();
    let exchange = MockExchange::with_candidate_limit(1);
    let room = RoomId::from("local0003");
    open_room(&exchange, &room).await;

    let mut relay = CandidateRelay::new(room.clone(), Role::Initiator, Arc::new(exchange.clone()));
    relay.on_local_candidate_discovered(host_candidate(1)).await.unwrap();

    let second = relay.on_local_candidate_discovered(host_candidate(2)).await;
    assert_eq!(second, Err(ExchangeError::RoomFull));
    assert_eq!(relay.pending(), 0, "Permanent failures are not retried");
}
