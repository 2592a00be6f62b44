mod config;
mod server;
mod signaling;
mod store;

pub use config::*;
pub use server::*;
pub use signaling::*;
pub use store::*;
