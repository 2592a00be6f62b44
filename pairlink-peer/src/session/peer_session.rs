use crate::transport::Transport;
use pairlink_core::{RoomId, Role};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    /// Initiator is creating and publishing its offer.
    Initiating,
    AwaitingAnswer,
    /// Joiner is applying the offer and publishing its answer.
    Joining,
    Negotiated,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
    Failed,
}

impl ChannelState {
    pub fn is_finished(self) -> bool {
        matches!(self, ChannelState::Closed | ChannelState::Failed)
    }
}

/// Snapshot published to every [`SessionHandle`](crate::session::SessionHandle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub negotiation: NegotiationState,
    pub channel: ChannelState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub direction: Direction,
    pub text: String,
}

/// Everything one participant knows about its session.
pub struct PeerSession {
    room: RoomId,
    role: Role,
    transport: Arc<dyn Transport>,
    negotiation: NegotiationState,
    channel: ChannelState,
    history: Vec<ChatEntry>,
}

impl PeerSession {
    pub fn new(room: RoomId, role: Role, transport: Arc<dyn Transport>) -> Self {
        Self {
            room,
            role,
            transport,
            negotiation: NegotiationState::Idle,
            channel: ChannelState::Connecting,
            history: Vec::new(),
        }
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn negotiation(&self) -> NegotiationState {
        self.negotiation
    }

    pub fn channel(&self) -> ChannelState {
        self.channel
    }

    pub fn history(&self) -> &[ChatEntry] {
        &self.history
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            negotiation: self.negotiation,
            channel: self.channel,
        }
    }

    pub(crate) fn set_negotiation(&mut self, state: NegotiationState) {
        self.negotiation = state;
    }

    pub(crate) fn set_channel(&mut self, state: ChannelState) {
        self.channel = state;
    }

    pub(crate) fn reassign_room(&mut self, room: RoomId) {
        self.room = room;
    }

    pub(crate) fn record(&mut self, direction: Direction, text: String) {
        self.history.push(ChatEntry { direction, text });
    }
}
