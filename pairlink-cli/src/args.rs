use clap::{Args, Parser, Subcommand};
use pairlink::model::IceServerConfig;
use pairlink::peer::{PeerConfig, TransportConfig};
use std::net::SocketAddr;

#[derive(Parser)]
#[command(name = "pairlink", version)]
#[command(about = "Two-party chat over a WebRTC data channel")]
pub struct Cli {
    #[command(flatten)]
    pub peer: PeerArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the exchange store both participants negotiate through.
    Serve {
        #[arg(long, env = "PAIRLINK_BIND", default_value = "0.0.0.0:3000")]
        bind: SocketAddr,

        /// Seconds of inactivity before a room is dropped.
        #[arg(long, default_value_t = 3600)]
        room_ttl: u64,

        #[arg(long, default_value_t = 256)]
        max_candidates: usize,
    },

    /// Open a new room and wait for someone to join it.
    Create,

    /// Join a room created by someone else.
    Join { room: String },
}

#[derive(Args)]
pub struct PeerArgs {
    /// Exchange store URL.
    #[arg(long, global = true, env = "PAIRLINK_SERVER", default_value = "http://localhost:3000")]
    pub server: String,

    /// STUN/TURN URLs, comma separated. Public STUN servers are used when empty.
    #[arg(long = "ice-url", global = true, env = "PAIRLINK_ICE_URLS", value_delimiter = ',')]
    pub ice_urls: Vec<String>,

    #[arg(long, global = true, env = "PAIRLINK_ICE_USERNAME")]
    pub ice_username: Option<String>,

    #[arg(long, global = true, env = "PAIRLINK_ICE_CREDENTIAL")]
    pub ice_credential: Option<String>,
}

impl PeerArgs {
    pub fn peer_config(&self) -> PeerConfig {
        let transport = if self.ice_urls.is_empty() {
            TransportConfig::default()
        } else {
            TransportConfig {
                ice_servers: vec![IceServerConfig {
                    urls: self.ice_urls.clone(),
                    username: self.ice_username.clone(),
                    credential: self.ice_credential.clone(),
                }],
            }
        };

        PeerConfig {
            transport,
            ..PeerConfig::default()
        }
    }
}
