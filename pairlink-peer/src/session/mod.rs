mod candidate_relay;
mod handle;
mod negotiator;
mod peer_session;
mod runner;

pub use candidate_relay::CandidateRelay;
pub use handle::{SessionEvents, SessionHandle};
pub use negotiator::{AnswerPoll, Negotiator, TransportEvents};
pub use peer_session::{
    ChannelState, ChatEntry, Direction, NegotiationState, PeerSession, SessionStatus,
};
pub use runner::SessionEvent;
