use std::sync::Arc;

use serde::Serialize;

use crate::domain::{
    GameEnd, GameStateView, MatchState, PlayerId, Role, RoomState, RoundResult, RoundStartNotice,
};
use crate::errors::ErrorCode;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOk {
    pub player_id: PlayerId,
    pub role: Role,
    pub room_state: MatchState,
    pub current_round: usize,
    pub host_score: u32,
    pub guest_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconnectOk {
    pub player_id: PlayerId,
    pub role: Role,
    pub room_state: MatchState,
    pub game_state: GameStateView,
}

/// Every frame the server emits, tagged by `type`.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    AuthOk(AuthOk),
    ReconnectOk(ReconnectOk),
    RoundStart(RoundStartNotice),
    RoundResult(RoundResult),
    GameEnd(GameEnd),
    RoomState(RoomState),
    RoomsList { data: Vec<RoomState> },
    Pong,
    Error { code: ErrorCode, message: String },
}

impl ServerMsg {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }

    /// Serialize into a frame that can be shared between recipients.
    pub fn to_frame(&self) -> Result<Arc<str>, serde_json::Error> {
        serde_json::to_string(self).map(Arc::from)
    }
}
