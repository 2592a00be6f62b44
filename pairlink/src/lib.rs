pub use pairlink_core::model::{Packet, RoomId};

pub mod model {
    pub use pairlink_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use pairlink_server::*;
}

#[cfg(feature = "peer")]
pub mod peer {
    pub use pairlink_peer::*;
}
