use std::sync::Arc;

use actix::prelude::*;
use dashmap::DashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{DeliveryError, Outbox, RoomState};
use crate::protocol::ServerMsg;

/// A serialized frame queued for one websocket actor.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct OutboundFrame(pub Arc<str>);

impl Outbox for Recipient<OutboundFrame> {
    fn deliver(&self, frame: Arc<str>) -> Result<(), DeliveryError> {
        if !self.connected() {
            return Err(DeliveryError::Closed);
        }
        self.do_send(OutboundFrame(frame));
        Ok(())
    }
}

/// Discovery connections of this process.
#[derive(Default)]
pub struct DiscoveryHub {
    connections: DashMap<Uuid, Recipient<OutboundFrame>>,
}

impl DiscoveryHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, conn_id: Uuid, recipient: Recipient<OutboundFrame>) {
        self.connections.insert(conn_id, recipient);
        debug!(%conn_id, total = self.connections.len(), "[DISCOVERY] Connection registered");
    }

    pub fn unregister(&self, conn_id: Uuid) {
        if self.connections.remove(&conn_id).is_some() {
            debug!(%conn_id, total = self.connections.len(), "[DISCOVERY] Connection unregistered");
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Forward a room update to every discovery connection, dropping the
    /// ones whose actor is gone.
    pub fn broadcast_room_state(&self, update: &RoomState) -> usize {
        let frame = match ServerMsg::RoomState(update.clone()).to_frame() {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, "[DISCOVERY] Failed to serialize room update");
                return 0;
            }
        };

        let mut delivered = 0;
        let mut stale = Vec::new();
        for entry in self.connections.iter() {
            match entry.value().deliver(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => stale.push(*entry.key()),
            }
        }
        for conn_id in stale {
            self.unregister(conn_id);
        }
        delivered
    }
}
