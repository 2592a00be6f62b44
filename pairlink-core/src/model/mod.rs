mod candidate;
mod description;
mod exchange;
mod ice;
mod packet;
mod role;
mod room;
mod slot;

pub use candidate::{Candidate, CandidateRecord};
pub use description::{SdpKind, SessionDescription};
pub use exchange::{AppendReceipt, Entry, ErrorBody, ErrorCode, SlotValue};
pub use ice::IceServerConfig;
pub use packet::{Packet, PacketError};
pub use role::Role;
pub use room::RoomId;
pub use slot::Slot;
