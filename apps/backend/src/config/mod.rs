//! Runtime configuration: environment-driven server settings and the fixed
//! match timings.

pub mod server;
pub mod timing;

pub use server::ServerConfig;
pub use timing::{MatchTiming, ROUND_COUNT};
