use crate::error::{PeerError, Result, TransportError};
use crate::session::candidate_relay::CandidateRelay;
use crate::session::handle::{SessionEvents, SessionHandle};
use crate::session::negotiator::{AnswerPoll, Negotiator, TransportEvents};
use crate::session::peer_session::{
    ChannelState, ChatEntry, Direction, NegotiationState, PeerSession, SessionStatus,
};
use crate::transport::TransportEvent;
use bytes::Bytes;
use pairlink_core::Packet;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

const COMMAND_CAPACITY: usize = 32;

/// Notifications delivered to the owner of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The initiator applied the joiner's answer.
    Negotiated,
    ChannelOpen,
    Message(String),
    /// The other participant announced it is leaving.
    PeerLeft,
    ChannelClosed,
    Failed(String),
}

pub(crate) enum SessionCommand {
    Send {
        text: String,
        reply: oneshot::Sender<Result<()>>,
    },
    History {
        reply: oneshot::Sender<Vec<ChatEntry>>,
    },
    Close {
        reply: oneshot::Sender<()>,
    },
}

/// Actor owning a [`PeerSession`]. All negotiation, relaying and chat for one
/// participant is serialized through its loop.
pub(crate) struct SessionRunner {
    negotiator: Negotiator,
    session: PeerSession,
    relay: CandidateRelay,
    command_rx: mpsc::Receiver<SessionCommand>,
    transport_rx: TransportEvents,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    status_tx: watch::Sender<SessionStatus>,
    answer_timer: Option<Interval>,
    candidate_timer: Option<Interval>,
}

impl SessionRunner {
    pub(crate) fn spawn(
        negotiator: Negotiator,
        session: PeerSession,
        transport_rx: TransportEvents,
    ) -> (SessionHandle, SessionEvents) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(session.status());

        let config = negotiator.config();
        let answer_timer = (session.negotiation() == NegotiationState::AwaitingAnswer)
            .then(|| timer(config.answer_poll_interval));
        let candidate_timer = Some(timer(config.candidate_poll_interval));

        let relay = CandidateRelay::new(
            session.room().clone(),
            session.role(),
            negotiator.exchange().clone(),
        );
        let handle = SessionHandle::new(
            session.room().clone(),
            session.role(),
            command_tx,
            status_rx,
        );

        let runner = Self {
            negotiator,
            session,
            relay,
            command_rx,
            transport_rx,
            event_tx,
            status_tx,
            answer_timer,
            candidate_timer,
        };
        tokio::spawn(runner.run());

        (handle, event_rx)
    }

    async fn run(mut self) {
        info!(
            "Session runner started for room {} as {}",
            self.session.room(),
            self.session.role()
        );

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => {
                            if !self.handle_command(c).await {
                                break;
                            }
                        }
                        None => {
                            info!("All session handles dropped");
                            self.shutdown(false).await;
                            break;
                        }
                    }
                }

                evt = self.transport_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_transport_event(e).await,
                        None => {
                            warn!("Transport event channel closed unexpectedly");
                            self.shutdown(false).await;
                            break;
                        }
                    }
                }

                _ = tick(&mut self.answer_timer) => self.on_answer_tick().await,

                _ = tick(&mut self.candidate_timer) => self.on_candidate_tick().await,
            }
        }

        info!("Session runner for room {} finished", self.session.room());
    }

    /// Returns `false` once the session has been closed.
    async fn handle_command(&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::Send { text, reply } => {
                let result = self.send_chat(text).await;
                let _ = reply.send(result);
            }
            SessionCommand::History { reply } => {
                let _ = reply.send(self.session.history().to_vec());
            }
            SessionCommand::Close { reply } => {
                self.shutdown(true).await;
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    async fn send_chat(&mut self, text: String) -> Result<()> {
        if self.session.channel() != ChannelState::Open {
            return Err(PeerError::ChannelUnavailable);
        }
        self.send_packet(&Packet::chat(text.clone())).await?;
        self.session.record(Direction::Sent, text);
        Ok(())
    }

    async fn send_packet(&mut self, packet: &Packet) -> Result<()> {
        let bytes = packet
            .encode()
            .map_err(|e| TransportError::Setup(format!("packet encoding: {e}")))?;
        self.session.transport().send(Bytes::from(bytes)).await?;
        Ok(())
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::LocalCandidate(candidate) => {
                if let Err(e) = self.relay.on_local_candidate_discovered(candidate).await {
                    warn!(
                        "Publishing local candidate failed ({} queued): {}",
                        self.relay.pending(),
                        e
                    );
                }
            }

            TransportEvent::ChannelOpen => {
                if self.session.channel() != ChannelState::Connecting {
                    return;
                }
                info!("Channel open in room {}", self.session.room());
                self.session.set_channel(ChannelState::Open);
                self.candidate_timer = None;
                self.publish_status();
                self.emit(SessionEvent::ChannelOpen);
            }

            TransportEvent::Message(data) => match Packet::decode(&data) {
                Ok(Packet::Chat { text }) => {
                    self.session.record(Direction::Received, text.clone());
                    self.emit(SessionEvent::Message(text));
                }
                Ok(Packet::Leave) => {
                    info!("Peer left room {}", self.session.room());
                    self.emit(SessionEvent::PeerLeft);
                }
                Err(e) => warn!("Dropping undecodable packet ({} bytes): {}", data.len(), e),
            },

            TransportEvent::ChannelClosed => {
                if self.session.channel().is_finished() {
                    return;
                }
                info!("Channel closed in room {}", self.session.room());
                self.session.set_channel(ChannelState::Closed);
                self.release_timers();
                self.close_transport().await;
                self.publish_status();
                self.emit(SessionEvent::ChannelClosed);
            }

            TransportEvent::Failed(reason) => {
                if self.session.channel().is_finished() {
                    return;
                }
                self.fail(reason).await;
            }
        }
    }

    async fn on_answer_tick(&mut self) {
        match self.negotiator.poll_for_answer(&mut self.session).await {
            Ok(AnswerPoll::Pending) => {}
            Ok(AnswerPoll::Applied) => {
                self.answer_timer = None;
                if let Some(timer) = self.candidate_timer.as_mut() {
                    timer.reset_immediately();
                }
                self.publish_status();
                self.emit(SessionEvent::Negotiated);
            }
            Ok(AnswerPoll::AlreadyNegotiated) => self.answer_timer = None,
            Err(e) if self.session.negotiation() == NegotiationState::Failed => {
                self.fail(e.to_string()).await;
            }
            Err(e) => warn!("Answer poll for room {} failed: {}", self.session.room(), e),
        }
    }

    async fn on_candidate_tick(&mut self) {
        if self.relay.pending() > 0 {
            if let Err(e) = self.relay.flush().await {
                warn!("Republishing local candidates failed: {}", e);
            }
        }

        if self.session.negotiation() != NegotiationState::Negotiated {
            return;
        }

        let transport = self.session.transport().clone();
        match self.relay.poll_for_remote_candidates(transport.as_ref()).await {
            Ok(0) => {}
            Ok(n) => debug!("Delivered {} remote candidate(s)", n),
            Err(e) => warn!("Reading remote candidates failed: {}", e),
        }
    }

    async fn fail(&mut self, reason: String) {
        error!("Session in room {} failed: {}", self.session.room(), reason);
        if self.session.negotiation() != NegotiationState::Negotiated {
            self.session.set_negotiation(NegotiationState::Failed);
        }
        self.session.set_channel(ChannelState::Failed);
        self.release_timers();
        self.close_transport().await;
        self.publish_status();
        self.emit(SessionEvent::Failed(reason));
    }

    async fn shutdown(&mut self, notify_peer: bool) {
        if notify_peer && self.session.channel() == ChannelState::Open {
            if let Err(e) = self.send_packet(&Packet::Leave).await {
                debug!("Leave notice not sent: {}", e);
            }
        }
        self.release_timers();
        self.close_transport().await;
        if !self.session.channel().is_finished() {
            self.session.set_channel(ChannelState::Closed);
        }
        self.publish_status();
    }

    async fn close_transport(&mut self) {
        if let Err(e) = self.session.transport().close().await {
            warn!("Closing transport failed: {}", e);
        }
    }

    fn release_timers(&mut self) {
        self.answer_timer = None;
        self.candidate_timer = None;
    }

    fn publish_status(&self) {
        self.status_tx.send_replace(self.session.status());
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        debug!(
            "Dropping {} session for room {}",
            self.session.role(),
            self.session.room()
        );
    }
}

fn timer(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Ticks `timer`, or never completes once it has been released.
async fn tick(timer: &mut Option<Interval>) -> Instant {
    match timer {
        Some(interval) => interval.tick().await,
        None => std::future::pending().await,
    }
}
