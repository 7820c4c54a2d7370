use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{error, warn};

use crate::domain::Session;
use crate::protocol::ServerMsg;

/// Send one message to every bound connection of a session.
///
/// The message is serialized once and delivered host first, then guest,
/// under the session read lock. A failed delivery is logged and does not
/// stop the other. Returns the number of successful deliveries.
pub fn broadcast(session: &RwLock<Session>, message: &ServerMsg) -> usize {
    let frame = match message.to_frame() {
        Ok(frame) => frame,
        Err(err) => {
            error!(error = %err, "[MATCH] Failed to serialize broadcast");
            return 0;
        }
    };
    broadcast_frame(session, &frame)
}

pub fn broadcast_frame(session: &RwLock<Session>, frame: &Arc<str>) -> usize {
    let session = session.read();
    let mut delivered = 0;
    for (role, connection) in session.connections() {
        match connection.send(frame) {
            Ok(()) => delivered += 1,
            Err(err) => warn!(
                room_key = %session.room_key(),
                %role,
                conn_id = %connection.conn_id(),
                error = %err,
                "[MATCH] Broadcast delivery failed"
            ),
        }
    }
    delivered
}
