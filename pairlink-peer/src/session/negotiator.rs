use crate::config::PeerConfig;
use crate::error::{ExchangeError, PeerError, Result};
use crate::exchange::{Exchange, HttpExchange};
use crate::session::handle::{SessionEvents, SessionHandle};
use crate::session::peer_session::{NegotiationState, PeerSession};
use crate::session::runner::SessionRunner;
use crate::transport::{RtcTransportFactory, TransportEvent, TransportFactory};
use pairlink_core::{Entry, RoomId, Role, SdpKind, SessionDescription, Slot, SlotValue};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

const TRANSPORT_EVENT_CAPACITY: usize = 256;

/// Receiving end of the channel a session's transport reports into.
pub type TransportEvents = mpsc::Receiver<TransportEvent>;

/// Outcome of a single answer poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerPoll {
    /// No answer in the store yet.
    Pending,
    /// The answer was found and applied just now.
    Applied,
    /// The session was already negotiated; nothing was read or applied.
    AlreadyNegotiated,
}

/// Runs the offer/answer protocol against an [`Exchange`].
#[derive(Clone)]
pub struct Negotiator {
    exchange: Arc<dyn Exchange>,
    factory: Arc<dyn TransportFactory>,
    config: PeerConfig,
}

impl Negotiator {
    pub fn new(
        exchange: Arc<dyn Exchange>,
        factory: Arc<dyn TransportFactory>,
        config: PeerConfig,
    ) -> Self {
        Self {
            exchange,
            factory,
            config,
        }
    }

    /// Negotiator talking to a `pairlink-server` over HTTP with `webrtc` transports.
    pub fn http(server_url: &str, config: PeerConfig) -> Result<Self> {
        let exchange = HttpExchange::new(server_url)?;
        let factory = RtcTransportFactory::new(config.transport.clone());
        Ok(Self::new(Arc::new(exchange), Arc::new(factory), config))
    }

    pub fn exchange(&self) -> &Arc<dyn Exchange> {
        &self.exchange
    }

    pub fn config(&self) -> &PeerConfig {
        &self.config
    }

    /// Opens a fresh room and starts waiting for a joiner in the background.
    pub async fn create_room(&self) -> Result<(RoomId, SessionHandle, SessionEvents)> {
        let (session, transport_rx) = self.initiate().await?;
        let room = session.room().clone();
        let (handle, events) = SessionRunner::spawn(self.clone(), session, transport_rx);
        Ok((room, handle, events))
    }

    /// Joins the room an initiator opened.
    pub async fn join_room(&self, room: &RoomId) -> Result<(SessionHandle, SessionEvents)> {
        let (session, transport_rx) = self.respond(room).await?;
        Ok(SessionRunner::spawn(self.clone(), session, transport_rx))
    }

    /// Initiator half of negotiation without a runner: creates the offer and
    /// publishes it under a newly generated room ID.
    pub async fn initiate(&self) -> Result<(PeerSession, TransportEvents)> {
        let (event_tx, event_rx) = mpsc::channel(TRANSPORT_EVENT_CAPACITY);
        let transport = self.factory.create(Role::Initiator, event_tx).await?;
        let mut session = PeerSession::new(RoomId::generate(), Role::Initiator, transport);
        session.set_negotiation(NegotiationState::Initiating);

        match self.publish_offer(&mut session).await {
            Ok(()) => {
                session.set_negotiation(NegotiationState::AwaitingAnswer);
                info!("Room {} created, waiting for an answer", session.room());
                Ok((session, event_rx))
            }
            Err(e) => {
                abandon(&mut session).await;
                Err(e)
            }
        }
    }

    async fn publish_offer(&self, session: &mut PeerSession) -> Result<()> {
        let offer = session.transport().create_offer().await?;
        let attempts = self.config.room_id_attempts.max(1);

        for attempt in 1..=attempts {
            let published = self
                .exchange
                .put(session.room(), Entry::Description(offer.clone()))
                .await;
            match published {
                Ok(_) => return Ok(()),
                Err(ExchangeError::SlotTaken(_)) => {
                    warn!(
                        "Room ID {} is taken (attempt {}/{})",
                        session.room(),
                        attempt,
                        attempts
                    );
                    session.reassign_room(RoomId::generate());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ExchangeError::SlotTaken(Slot::Offer).into())
    }

    /// Joiner half of negotiation without a runner. Fails with
    /// [`PeerError::RoomNotFound`] before touching the store when there is no offer.
    pub async fn respond(&self, room: &RoomId) -> Result<(PeerSession, TransportEvents)> {
        let offer = match self.exchange.get(room, Slot::Offer).await? {
            Some(SlotValue::Description(desc)) => desc,
            Some(SlotValue::Candidates(_)) => {
                return Err(ExchangeError::Decode("offer slot holds candidates".into()).into());
            }
            None => return Err(PeerError::RoomNotFound),
        };

        let (event_tx, event_rx) = mpsc::channel(TRANSPORT_EVENT_CAPACITY);
        let transport = self.factory.create(Role::Joiner, event_tx).await?;
        let mut session = PeerSession::new(room.clone(), Role::Joiner, transport);
        session.set_negotiation(NegotiationState::Joining);

        match self.publish_answer(&mut session, &offer).await {
            Ok(()) => {
                session.set_negotiation(NegotiationState::Negotiated);
                info!("Joined room {}", room);
                Ok((session, event_rx))
            }
            Err(e) => {
                error!("Joining room {} failed: {}", room, e);
                abandon(&mut session).await;
                Err(e)
            }
        }
    }

    async fn publish_answer(
        &self,
        session: &mut PeerSession,
        offer: &SessionDescription,
    ) -> Result<()> {
        if offer.kind != SdpKind::Offer {
            return Err(PeerError::MalformedDescription(format!(
                "expected an offer, found {:?}",
                offer.kind
            )));
        }
        session.transport().set_remote_description(offer).await?;
        let answer = session.transport().create_answer().await?;

        match self
            .exchange
            .put(session.room(), Entry::Description(answer))
            .await
        {
            Ok(_) => Ok(()),
            Err(ExchangeError::SlotTaken(_)) => Err(PeerError::RoomFull),
            Err(e) => Err(e.into()),
        }
    }

    /// One answer poll step for an initiator.
    ///
    /// Store errors are returned without touching the session, so the caller
    /// can retry. A description the transport rejects moves the session to
    /// [`NegotiationState::Failed`].
    pub async fn poll_for_answer(&self, session: &mut PeerSession) -> Result<AnswerPoll> {
        match session.negotiation() {
            NegotiationState::Negotiated => return Ok(AnswerPoll::AlreadyNegotiated),
            NegotiationState::Failed => return Err(PeerError::SessionClosed),
            NegotiationState::AwaitingAnswer => {}
            NegotiationState::Idle | NegotiationState::Initiating | NegotiationState::Joining => {
                return Ok(AnswerPoll::Pending);
            }
        }

        let answer = match self.exchange.get(session.room(), Slot::Answer).await? {
            Some(SlotValue::Description(desc)) => desc,
            Some(SlotValue::Candidates(_)) => {
                return Err(ExchangeError::Decode("answer slot holds candidates".into()).into());
            }
            None => return Ok(AnswerPoll::Pending),
        };

        let applied = if answer.kind == SdpKind::Answer {
            session
                .transport()
                .set_remote_description(&answer)
                .await
                .map_err(PeerError::from)
        } else {
            Err(PeerError::MalformedDescription(format!(
                "expected an answer, found {:?}",
                answer.kind
            )))
        };

        if let Err(e) = applied {
            error!("Answer for room {} rejected: {}", session.room(), e);
            session.set_negotiation(NegotiationState::Failed);
            return Err(e);
        }

        session.set_negotiation(NegotiationState::Negotiated);
        info!("Answer applied for room {}", session.room());
        Ok(AnswerPoll::Applied)
    }
}

async fn abandon(session: &mut PeerSession) {
    session.set_negotiation(NegotiationState::Failed);
    if let Err(e) = session.transport().close().await {
        warn!("Closing abandoned transport failed: {}", e);
    }
}
