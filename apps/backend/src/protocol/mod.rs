//! Payloads the server sends over websockets.

pub mod events;

pub use events::{AuthOk, ReconnectOk, ServerMsg};
