//! Error codes for the GeoDuel match server.
//!
//! Every failure surfaced to a client (HTTP problem response or websocket
//! `error` frame) carries one of these codes. Add new codes here; never pass
//! ad-hoc strings as error codes.

use core::fmt;

use serde::{Serialize, Serializer};

/// Centralized error codes.
///
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Room access
    /// Connection request without a room hash
    MissingRoomHash,
    /// Room hash rejected by the verification service
    InvalidRoomHash,

    // Match lifecycle
    /// No match for the given room
    MatchNotFound,
    /// Both role slots are taken
    MatchFull,
    /// Identifier does not belong to this match
    CannotReconnect,
    /// Player is not host or guest of this match
    NotAParticipant,
    /// Operation not allowed in the current match state
    InvalidState,
    /// No round is currently active
    NoSuchRound,
    /// Every round has already been started
    AllRoundsPlayed,
    /// Round content never became ready
    InitializationTimeout,
    /// Content provider failed after retries
    UpstreamContentFailure,

    // Request validation
    /// Frame could not be parsed
    BadRequest,
    /// Required field missing from a command
    MissingFields,

    // System
    /// Upstream HTTP service failed
    UpstreamError,
    /// Internal server error
    InternalError,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRoomHash => "MISSING_ROOM_HASH",
            Self::InvalidRoomHash => "INVALID_ROOM_HASH",

            Self::MatchNotFound => "MATCH_NOT_FOUND",
            Self::MatchFull => "MATCH_FULL",
            Self::CannotReconnect => "CANNOT_RECONNECT",
            Self::NotAParticipant => "NOT_A_PARTICIPANT",
            Self::InvalidState => "INVALID_STATE",
            Self::NoSuchRound => "NO_SUCH_ROUND",
            Self::AllRoundsPlayed => "ALL_ROUNDS_PLAYED",
            Self::InitializationTimeout => "INITIALIZATION_TIMEOUT",
            Self::UpstreamContentFailure => "UPSTREAM_CONTENT_FAILURE",

            Self::BadRequest => "BAD_REQUEST",
            Self::MissingFields => "MISSING_FIELDS",

            Self::UpstreamError => "UPSTREAM_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
