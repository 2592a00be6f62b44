use crate::error::{PeerError, Result};
use crate::session::peer_session::{ChannelState, ChatEntry, SessionStatus};
use crate::session::runner::{SessionCommand, SessionEvent};
use pairlink_core::{RoomId, Role};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};

/// Stream of [`SessionEvent`]s for one session. Ends when the session runner exits.
pub type SessionEvents = mpsc::UnboundedReceiver<SessionEvent>;

/// Cloneable handle to a running session. The session is torn down once
/// [`close`](Self::close) is called or every handle has been dropped.
#[derive(Clone)]
pub struct SessionHandle {
    room: RoomId,
    role: Role,
    commands: mpsc::Sender<SessionCommand>,
    status: watch::Receiver<SessionStatus>,
}

impl SessionHandle {
    pub(crate) fn new(
        room: RoomId,
        role: Role,
        commands: mpsc::Sender<SessionCommand>,
        status: watch::Receiver<SessionStatus>,
    ) -> Self {
        Self {
            room,
            role,
            commands,
            status,
        }
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Sends a chat message. Fails with [`PeerError::ChannelUnavailable`]
    /// (recording nothing) unless the channel is open.
    pub async fn send(&self, text: impl Into<String>) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.request(SessionCommand::Send {
            text: text.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| PeerError::SessionClosed)?
    }

    pub async fn history(&self) -> Result<Vec<ChatEntry>> {
        let (reply, rx) = oneshot::channel();
        self.request(SessionCommand::History { reply }).await?;
        rx.await.map_err(|_| PeerError::SessionClosed)
    }

    /// Resolves once the data channel is open.
    pub async fn wait_for_open(&self, timeout: Duration) -> Result<()> {
        let mut status = self.status.clone();
        let settled = tokio::time::timeout(
            timeout,
            status.wait_for(|s| s.channel != ChannelState::Connecting),
        )
        .await;

        match settled {
            Err(_) => Err(PeerError::Timeout),
            Ok(Err(_)) => Err(PeerError::SessionClosed),
            Ok(Ok(s)) if s.channel == ChannelState::Open => Ok(()),
            Ok(Ok(_)) => Err(PeerError::SessionClosed),
        }
    }

    /// Says goodbye to the peer if the channel is open, then closes the
    /// transport. Closing an already closed session is a no-op.
    pub async fn close(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        if self.request(SessionCommand::Close { reply }).await.is_err() {
            return Ok(());
        }
        let _ = rx.await;
        Ok(())
    }

    async fn request(&self, cmd: SessionCommand) -> Result<()> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| PeerError::SessionClosed)
    }
}
