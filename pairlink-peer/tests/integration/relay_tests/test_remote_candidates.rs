use pairlink_core::{CandidateRecord, Entry, Role, RoomId, SessionDescription};
use pairlink_peer::{CandidateRelay, Exchange, Transport};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::integration::init_tracing;
use crate::utils::{MockExchange, MockTransport, host_candidate};

async fn open_room(exchange: &MockExchange, room: &RoomId) {
    exchange
        .put(room, Entry::Description(SessionDescription::offer("v=0")))
        .await
        .unwrap();
}

async fn append(exchange: &MockExchange, room: &RoomId, from: Role, n: u8) {
    exchange
        .put(room, Entry::Candidate(CandidateRecord::new(from, host_candidate(n))))
        .await
        .unwrap();
}

/// Initiator-side transport that already holds the joiner's answer.
async fn negotiated_transport() -> MockTransport {
    let (tx, _rx) = mpsc::channel(16);
    let transport = MockTransport::new(Role::Initiator, tx);
    transport
        .set_remote_description(&SessionDescription::answer("v=0"))
        .await
        .unwrap();
    transport
}

#[tokio::test]
async fn test_delivery_is_ordered_and_skips_own_entries() {
    init_tracing();
    let exchange = MockExchange::new();
    let room = RoomId::from("relay0001");
    open_room(&exchange, &room).await;

    append(&exchange, &room, Role::Joiner, 1).await;
    append(&exchange, &room, Role::Initiator, 2).await;
    append(&exchange, &room, Role::Joiner, 3).await;
    append(&exchange, &room, Role::Joiner, 4).await;

    let transport = negotiated_transport().await;
    let mut relay = CandidateRelay::new(room.clone(), Role::Initiator, Arc::new(exchange.clone()));

    let delivered = relay.poll_for_remote_candidates(&transport).await.unwrap();
    assert_eq!(delivered, 3);
    assert_eq!(relay.cursor(), 4);
    assert_eq!(
        transport.remote_candidates().await,
        vec![host_candidate(1), host_candidate(3), host_candidate(4)]
    );

    // Later entries are picked up from the cursor.
    append(&exchange, &room, Role::Joiner, 5).await;
    let delivered = relay.poll_for_remote_candidates(&transport).await.unwrap();
    assert_eq!(delivered, 1);
    assert_eq!(transport.remote_candidates().await.last(), Some(&host_candidate(5)));
}

#[tokio::test]
async fn test_redelivered_candidates_are_applied_once() {
    init_tracing();
    let exchange = MockExchange::new();
    let room = RoomId::from("relay0002");
    open_room(&exchange, &room).await;

    append(&exchange, &room, Role::Joiner, 1).await;
    append(&exchange, &room, Role::Joiner, 2).await;

    let transport = negotiated_transport().await;
    let mut relay = CandidateRelay::new(room.clone(), Role::Initiator, Arc::new(exchange.clone()));
    assert_eq!(relay.poll_for_remote_candidates(&transport).await.unwrap(), 2);

    // A retried append whose first reply was lost lands in the sequence twice.
    append(&exchange, &room, Role::Joiner, 2).await;
    append(&exchange, &room, Role::Joiner, 1).await;

    assert_eq!(relay.poll_for_remote_candidates(&transport).await.unwrap(), 0);
    assert_eq!(relay.poll_for_remote_candidates(&transport).await.unwrap(), 0);
    assert_eq!(
        transport.remote_candidates().await,
        vec![host_candidate(1), host_candidate(2)]
    );
}

#[tokio::test]
async fn test_rejected_candidate_does_not_stop_the_batch() {
    init_tracing();
    let exchange = MockExchange::new();
    let room = RoomId::from("relay0003");
    open_room(&exchange, &room).await;

    for n in 1..=3 {
        append(&exchange, &room, Role::Initiator, n).await;
    }

    let (tx, _rx) = mpsc::channel(16);
    let transport = MockTransport::new(Role::Joiner, tx);
    transport
        .set_remote_description(&SessionDescription::offer("v=0"))
        .await
        .unwrap();
    transport.reject_candidate(&host_candidate(2)).await;

    let mut relay = CandidateRelay::new(room.clone(), Role::Joiner, Arc::new(exchange.clone()));
    let delivered = relay.poll_for_remote_candidates(&transport).await.unwrap();

    assert_eq!(delivered, 2);
    assert_eq!(relay.cursor(), 3);
    assert_eq!(
        transport.remote_candidates().await,
        vec![host_candidate(1), host_candidate(3)]
    );
}

#[tokio::test]
async fn test_store_outage_keeps_the_cursor() {
    init_tracing();
    let exchange = MockExchange::new();
    let room = RoomId::from("relay0004");
    open_room(&exchange, &room).await;
    append(&exchange, &room, Role::Joiner, 1).await;

    let transport = negotiated_transport().await;
    let mut relay = CandidateRelay::new(room.clone(), Role::Initiator, Arc::new(exchange.clone()));

    exchange.fail_next(1).await;
    let result = relay.poll_for_remote_candidates(&transport).await;
    assert!(matches!(result, Err(ref e) if e.is_transient()));
    assert_eq!(relay.cursor(), 0);

    assert_eq!(relay.poll_for_remote_candidates(&transport).await.unwrap(), 1);
}
