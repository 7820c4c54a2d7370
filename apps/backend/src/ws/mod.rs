//! Websocket transport: player sessions, discovery and room update fan-out.

pub mod broker;
pub mod discovery;
pub mod hub;
pub mod protocol;
pub mod session;
