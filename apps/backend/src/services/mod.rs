pub mod cleanup;
pub mod fanout;
pub mod match_flow;
pub mod ports;
pub mod prefetch;
pub mod readiness;
pub mod registry;

pub use match_flow::{CommandReply, MatchCommand, MatchService};
pub use registry::{MatchEntry, SessionRegistry};
