//! Non-owning handles to player connections.
//!
//! A session only ever holds a [`ConnectionHandle`]; the transport behind it
//! (an actor mailbox, a channel in tests) is owned elsewhere. Dropping or
//! replacing a handle never closes the underlying socket.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("connection closed")]
    Closed,
    #[error("connection mailbox full")]
    Full,
}

/// Something that can accept serialized frames for one connection.
pub trait Outbox: Send + Sync {
    fn deliver(&self, frame: Arc<str>) -> Result<(), DeliveryError>;
}

impl Outbox for UnboundedSender<Arc<str>> {
    fn deliver(&self, frame: Arc<str>) -> Result<(), DeliveryError> {
        self.send(frame).map_err(|_| DeliveryError::Closed)
    }
}

#[derive(Clone)]
pub struct ConnectionHandle {
    conn_id: Uuid,
    outbox: Arc<dyn Outbox>,
}

impl ConnectionHandle {
    pub fn new(conn_id: Uuid, outbox: Arc<dyn Outbox>) -> Self {
        Self { conn_id, outbox }
    }

    /// Handle backed by an unbounded channel; the receiver sees every frame.
    pub fn channel() -> (Self, tokio::sync::mpsc::UnboundedReceiver<Arc<str>>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Self::new(Uuid::new_v4(), Arc::new(tx)), rx)
    }

    pub fn conn_id(&self) -> Uuid {
        self.conn_id
    }

    pub fn send(&self, frame: &Arc<str>) -> Result<(), DeliveryError> {
        self.outbox.deliver(frame.clone())
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("conn_id", &self.conn_id)
            .finish_non_exhaustive()
    }
}
