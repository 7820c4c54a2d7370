use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use tracing::warn;

use crate::domain::RoomKey;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::state::app_state::AppState;
use crate::ws::discovery::DiscoverySession;
use crate::ws::session::MatchWsSession;

#[derive(Debug, Deserialize)]
struct RoomQuery {
    #[serde(rename = "roomHash")]
    room_hash: Option<String>,
}

/// `GET /ws?roomHash=...`: verify the room, make sure its match exists and
/// upgrade to a player connection.
async fn match_socket(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<RoomQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let room_hash = query
        .room_hash
        .as_deref()
        .map(str::trim)
        .filter(|hash| !hash.is_empty())
        .ok_or_else(|| AppError::unauthorized(ErrorCode::MissingRoomHash, "Missing roomHash"))?;

    let verified = match app_state.verifier().verify(room_hash).await {
        Ok(ok) => ok,
        Err(err) => {
            warn!(room_hash, error = %err, "[WS SESSION] room hash verification failed");
            false
        }
    };
    if !verified {
        return Err(AppError::unauthorized(ErrorCode::InvalidRoomHash, "Invalid room hash").into());
    }

    let room_key = RoomKey::new(room_hash);
    app_state.registry().create_if_absent(&room_key);

    let session = MatchWsSession::new(room_key, app_state.matches().clone());
    ws::start(session, &req, stream)
}

/// `GET /ws/discovery`: stream of waiting rooms.
async fn discovery_socket(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let rooms = app_state.registry().list_waiting();
    let session = DiscoverySession::new(app_state.discovery().clone(), rooms);
    ws::start(session, &req, stream)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::get().to(match_socket)))
        .service(web::resource("/discovery").route(web::get().to(discovery_socket)));
}
