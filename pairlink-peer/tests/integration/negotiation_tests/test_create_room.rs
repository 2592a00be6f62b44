use pairlink_core::{Entry, Role, SessionDescription, Slot};
use pairlink_peer::{Exchange, ExchangeError, NegotiationState, PeerError};

use crate::integration::init_tracing;
use crate::utils::{MockExchange, MockTransportFactory, mock_negotiator};

#[tokio::test]
async fn test_create_publishes_exactly_one_offer() {
    init_tracing();
    let exchange = MockExchange::new();
    let factory = MockTransportFactory::new();
    let negotiator = mock_negotiator(&exchange, &factory);

    let (session, _rx) = negotiator.initiate().await.unwrap();

    assert_eq!(session.role(), Role::Initiator);
    assert_eq!(session.negotiation(), NegotiationState::AwaitingAnswer);
    assert_eq!(session.room().as_str().len(), 9);

    let offers = exchange.writes_to(Slot::Offer).await;
    assert_eq!(offers.len(), 1);
    assert_eq!(&offers[0].0, session.room());

    // The offer slot is write-once.
    let again = exchange
        .put(
            session.room(),
            Entry::Description(SessionDescription::offer("v=0\r\no=- other")),
        )
        .await;
    assert_eq!(again, Err(ExchangeError::SlotTaken(Slot::Offer)));
}

#[tokio::test]
async fn test_room_id_collision_picks_a_fresh_id() {
    init_tracing();
    let exchange = MockExchange::new();
    let factory = MockTransportFactory::new();
    let negotiator = mock_negotiator(&exchange, &factory);

    exchange.collide_next_offers(2).await;
    let (session, _rx) = negotiator.initiate().await.unwrap();

    let offers = exchange.writes_to(Slot::Offer).await;
    assert_eq!(offers.len(), 1);
    assert_eq!(&offers[0].0, session.room());
    assert!(exchange.store().contains(session.room()));
}

#[tokio::test]
async fn test_create_gives_up_after_bounded_collisions() {
    init_tracing();
    let exchange = MockExchange::new();
    let factory = MockTransportFactory::new();
    let negotiator = mock_negotiator(&exchange, &factory);

    let attempts = negotiator.config().room_id_attempts;
    exchange.collide_next_offers(attempts).await;

    let result = negotiator.initiate().await;
    assert!(matches!(
        result,
        Err(PeerError::Exchange(ExchangeError::SlotTaken(Slot::Offer)))
    ));
    assert!(exchange.writes().await.is_empty());

    let transport = factory.transport(Role::Initiator).await.unwrap();
    assert!(transport.is_closed().await);
}

#[tokio::test]
async fn test_create_room_spawns_session() {
    init_tracing();
    let exchange = MockExchange::new();
    let factory = MockTransportFactory::new();
    let negotiator = mock_negotiator(&exchange, &factory);

    let (room, handle, _events) = negotiator.create_room().await.unwrap();

    assert_eq!(handle.room(), &room);
    assert_eq!(handle.role(), Role::Initiator);
    assert_eq!(
        handle.status().negotiation,
        NegotiationState::AwaitingAnswer
    );

    handle.close().await.unwrap();
}
