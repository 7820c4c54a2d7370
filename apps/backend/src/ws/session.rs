use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web_actors::ws;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{ConnectionHandle, Role, RoomKey};
use crate::errors::ErrorCode;
use crate::protocol::ServerMsg;
use crate::services::{CommandReply, MatchService};
use crate::ws::hub::OutboundFrame;
use crate::ws::protocol::{parse_client_msg, ClientMsg};

pub(crate) const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
pub(crate) const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

/// One player connection to one match.
pub struct MatchWsSession {
    conn_id: Uuid,
    room_key: RoomKey,
    service: MatchService,
    /// Handle given to the session when a command binds this connection
    handle: Option<ConnectionHandle>,
    /// Role this connection is bound to, once `auth`/`reconnect` succeeded
    role: Option<Role>,
    last_heartbeat: Instant,
}

impl MatchWsSession {
    pub fn new(room_key: RoomKey, service: MatchService) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            room_key,
            service,
            handle: None,
            role: None,
            last_heartbeat: Instant::now(),
        }
    }

    pub(crate) fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error(ctx: &mut ws::WebsocketContext<Self>, code: ErrorCode, message: impl Into<String>) {
        Self::send_json(ctx, &ServerMsg::error(code, message));
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    room_key = %actor.room_key,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let command = match parse_client_msg(text) {
            Ok(ClientMsg::Ping) => {
                Self::send_json(ctx, &ServerMsg::Pong);
                return;
            }
            Ok(ClientMsg::Command(command)) => command,
            Err(err) => {
                debug!(conn_id = %self.conn_id, error = %err, "[WS SESSION] rejected frame");
                Self::send_error(ctx, err.code(), err.to_string());
                return;
            }
        };

        let Some(handle) = self.handle.clone() else {
            Self::send_error(ctx, ErrorCode::InternalError, "connection not ready");
            return;
        };

        match self.service.execute(&self.room_key, &handle, command) {
            Ok(CommandReply::Joined(reply)) => {
                self.role = Some(reply.role);
                Self::send_json(ctx, &ServerMsg::AuthOk(reply));
            }
            Ok(CommandReply::Reconnected(reply)) => {
                self.role = Some(reply.role);
                Self::send_json(ctx, &ServerMsg::ReconnectOk(reply));
            }
            Ok(CommandReply::AnswerAccepted) => {}
            Err(err) if err.is_race_loss() => {}
            Err(err) => {
                info!(
                    conn_id = %self.conn_id,
                    room_key = %self.room_key,
                    error = %err,
                    "[WS SESSION] command rejected"
                );
                Self::send_error(ctx, err.code(), err.to_string());
            }
        }
    }
}

impl Actor for MatchWsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            room_key = %self.room_key,
            "[WS SESSION] started"
        );
        let recipient = ctx.address().recipient::<OutboundFrame>();
        self.handle = Some(ConnectionHandle::new(self.conn_id, Arc::new(recipient)));
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(role) = self.role {
            self.service.detach(&self.room_key, role, self.conn_id);
        }
        info!(
            conn_id = %self.conn_id,
            room_key = %self.room_key,
            "[WS SESSION] stopped"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for MatchWsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_error(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    room_key = %self.room_key,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<OutboundFrame> for MatchWsSession {
    type Result = ();

    fn handle(&mut self, msg: OutboundFrame, ctx: &mut Self::Context) -> Self::Result {
        ctx.text(msg.0.as_ref());
    }
}
