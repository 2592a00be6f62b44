mod api_error;
mod http_handler;
mod router;
mod signaling_service;

pub use api_error::*;
pub use http_handler::*;
pub use router::*;
pub use signaling_service::*;
