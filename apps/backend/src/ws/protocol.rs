//! Inbound websocket frames: `{"event": "...", "data": {...}}`.
//!
//! Parsing is two-step so a well-formed frame with missing fields gets a
//! `MISSING_FIELDS` error instead of a generic `BAD_REQUEST`.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{Answer, PlayerId};
use crate::errors::ErrorCode;
use crate::services::MatchCommand;

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
struct AuthData {
    #[serde(rename = "playerID", alias = "playerId", default)]
    player_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReconnectData {
    #[serde(rename = "playerId", alias = "playerID", default)]
    player_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SubmitAnswerData {
    #[serde(rename = "playerId", alias = "playerID", default)]
    player_id: Option<String>,
    #[serde(rename = "countryCode", default)]
    country_code: Option<String>,
    #[serde(rename = "countryName", default)]
    country_name: Option<String>,
}

/// A decoded client frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMsg {
    Command(MatchCommand),
    Ping,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(String),
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
    #[error("missing fields: {0}")]
    MissingFields(&'static str),
}

impl FrameError {
    pub fn code(&self) -> ErrorCode {
        match self {
            FrameError::Malformed(_) | FrameError::UnknownEvent(_) => ErrorCode::BadRequest,
            FrameError::MissingFields(_) => ErrorCode::MissingFields,
        }
    }
}

/// Empty strings count as absent.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn data_as<T>(data: Value) -> Result<T, FrameError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data).map_err(|err| FrameError::Malformed(err.to_string()))
}

pub fn parse_client_msg(text: &str) -> Result<ClientMsg, FrameError> {
    let envelope: Envelope =
        serde_json::from_str(text).map_err(|err| FrameError::Malformed(err.to_string()))?;

    match envelope.event.as_str() {
        "ping" => Ok(ClientMsg::Ping),
        "auth" => {
            let data: AuthData = data_as(envelope.data)?;
            Ok(ClientMsg::Command(MatchCommand::Auth {
                player_id: present(data.player_id).map(PlayerId::from),
            }))
        }
        "reconnect" => {
            let data: ReconnectData = data_as(envelope.data)?;
            let player_id = present(data.player_id).ok_or(FrameError::MissingFields("playerId"))?;
            Ok(ClientMsg::Command(MatchCommand::Reconnect {
                player_id: PlayerId::from(player_id),
            }))
        }
        "submit_answer" => {
            let data: SubmitAnswerData = data_as(envelope.data)?;
            let (Some(player_id), Some(country_code)) =
                (present(data.player_id), present(data.country_code))
            else {
                return Err(FrameError::MissingFields("playerId, countryCode"));
            };
            Ok(ClientMsg::Command(MatchCommand::SubmitAnswer {
                player_id: PlayerId::from(player_id),
                answer: Answer::new(country_code, present(data.country_name).unwrap_or_default()),
            }))
        }
        other => Err(FrameError::UnknownEvent(other.to_string())),
    }
}
