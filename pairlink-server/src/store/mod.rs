mod room_record;
mod room_store;
mod store_error;

pub use room_record::*;
pub use room_store::*;
pub use store_error::*;
