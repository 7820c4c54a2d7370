use std::sync::Arc;
use std::time::Instant;

use actix::prelude::*;
use actix_web_actors::ws;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::RoomState;
use crate::protocol::ServerMsg;
use crate::ws::hub::{DiscoveryHub, OutboundFrame};
use crate::ws::session::{CLIENT_TIMEOUT, HEARTBEAT_INTERVAL};

/// Read-only connection that lists waiting rooms and then streams updates.
pub struct DiscoverySession {
    conn_id: Uuid,
    hub: Arc<DiscoveryHub>,
    initial_rooms: Vec<RoomState>,
    last_heartbeat: Instant,
}

impl DiscoverySession {
    pub fn new(hub: Arc<DiscoveryHub>, initial_rooms: Vec<RoomState>) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            hub,
            initial_rooms,
            last_heartbeat: Instant::now(),
        }
    }
}

impl Actor for DiscoverySession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            rooms = self.initial_rooms.len(),
            "[DISCOVERY] connection started"
        );

        let rooms = std::mem::take(&mut self.initial_rooms);
        match serde_json::to_string(&ServerMsg::RoomsList { data: rooms }) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[DISCOVERY] failed to serialize rooms list"),
        }

        self.hub
            .register(self.conn_id, ctx.address().recipient::<OutboundFrame>());

        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, "[DISCOVERY] heartbeat timed out");
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.hub.unregister(self.conn_id);
        info!(conn_id = %self.conn_id, "[DISCOVERY] connection stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for DiscoverySession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "[DISCOVERY] protocol error");
                ctx.stop();
            }
        }
    }
}

impl Handler<OutboundFrame> for DiscoverySession {
    type Result = ();

    fn handle(&mut self, msg: OutboundFrame, ctx: &mut Self::Context) -> Self::Result {
        ctx.text(msg.0.as_ref());
    }
}
