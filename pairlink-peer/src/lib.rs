pub mod config;
pub mod error;
pub mod exchange;
pub mod session;
pub mod transport;

pub use config::PeerConfig;
pub use error::{ExchangeError, PeerError, TransportError};
pub use exchange::{Exchange, HttpExchange};
pub use session::*;
pub use transport::{
    RtcTransport, RtcTransportFactory, Transport, TransportConfig, TransportEvent,
    TransportFactory,
};
