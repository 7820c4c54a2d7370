//! Domain layer: match state, round rules and the payloads they produce.

pub mod connection;
pub mod notices;
pub mod round;
pub mod scoring;
pub mod session;
pub mod state;

#[cfg(test)]
mod tests_props_round_index;
#[cfg(test)]
mod tests_role_binding;
#[cfg(test)]
mod tests_round_lifecycle;
#[cfg(test)]
mod tests_scoring;

// Re-exports for ergonomics
pub use connection::{ConnectionHandle, DeliveryError, Outbox};
pub use notices::{AnswerView, GameEnd, GameStateView, RoomState, RoundResult, RoundStartNotice};
pub use round::{Answer, Coordinates, PublicContent, Round, RoundContent};
pub use scoring::Winner;
pub use session::Session;
pub use state::{MatchState, PlayerId, Role, RoomKey};
