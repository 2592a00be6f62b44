use anyhow::{Context, Result};
use colored::*;
use pairlink::RoomId;
use pairlink::peer::{Negotiator, PeerError, SessionEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::args::PeerArgs;

const QUIT_COMMAND: &str = "/quit";

pub enum Mode {
    Create,
    Join(String),
}

/// Negotiates a session and runs a line-oriented chat over it until either
/// side leaves.
pub async fn run(mode: Mode, peer: &PeerArgs) -> Result<()> {
    let negotiator = Negotiator::http(&peer.server, peer.peer_config())
        .with_context(|| format!("Invalid exchange server '{}'", peer.server))?;

    let (handle, mut events) = match mode {
        Mode::Create => {
            let (room, handle, events) = negotiator
                .create_room()
                .await
                .context("Failed to create room")?;
            println!("{} {}", "Room created:".green().bold(), room.as_str().yellow().bold());
            println!("Share this room ID with your peer and wait for them to join...");
            (handle, events)
        }
        Mode::Join(room) => {
            let room = RoomId::from(room.trim());
            let (handle, events) = match negotiator.join_room(&room).await {
                Ok(joined) => joined,
                Err(PeerError::RoomNotFound) => anyhow::bail!("Room {} does not exist", room),
                Err(PeerError::RoomFull) => anyhow::bail!("Room {} already has two participants", room),
                Err(e) => return Err(e).context("Failed to join room"),
            };
            println!("{} {}", "Joined room".green().bold(), room.as_str().yellow().bold());
            (handle, events)
        }
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(SessionEvent::Negotiated) => {
                        println!("{}", "Peer answered, connecting...".cyan());
                    }
                    Some(SessionEvent::ChannelOpen) => {
                        println!(
                            "{}",
                            format!("Connected! Type a message, {QUIT_COMMAND} to leave.").green().bold()
                        );
                    }
                    Some(SessionEvent::Message(text)) => {
                        println!("{} {}", "peer>".magenta().bold(), text);
                    }
                    Some(SessionEvent::PeerLeft) => {
                        println!("{}", "Peer left the chat.".yellow());
                        break;
                    }
                    Some(SessionEvent::ChannelClosed) => {
                        println!("{}", "Connection closed.".yellow());
                        break;
                    }
                    Some(SessionEvent::Failed(reason)) => {
                        eprintln!("{} {}", "Connection failed:".red().bold(), reason);
                        break;
                    }
                    None => break,
                }
            }

            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                let text = line.trim();
                if text.is_empty() {
                    continue;
                }
                if text == QUIT_COMMAND {
                    break;
                }

                match handle.send(text).await {
                    Ok(()) => debug!("Sent {} bytes", text.len()),
                    Err(PeerError::ChannelUnavailable) => {
                        println!("{}", "Not connected yet, message not sent.".yellow());
                    }
                    Err(e) => return Err(e).context("Failed to send message"),
                }
            }
        }
    }

    handle.close().await?;
    println!("{}", "Bye!".bold());
    Ok(())
}
