//! Domain-level error type used by the match engine.
//!
//! This error type is transport-agnostic. Websocket handlers translate it into
//! an `error` frame; HTTP handlers convert it into `AppError` through the
//! provided `From<DomainError> for AppError` implementation.

use thiserror::Error;

use crate::domain::Role;
use crate::errors::ErrorCode;

/// Central domain error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// No session registered under the given room key
    #[error("match {0} not found")]
    NotFound(String),
    /// The requested role slot already has a player identifier
    #[error("{0} slot is already taken")]
    RoleFull(Role),
    /// Supplied identifier does not belong to the requested slot
    #[error("player cannot reconnect to this match")]
    CannotReconnect,
    /// Submitting player is neither host nor guest
    #[error("player {0} is not part of this match")]
    NotAParticipant(String),
    /// Operation attempted in the wrong lifecycle state
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// No active round to operate on
    #[error("no active round (index {0})")]
    NoSuchRound(usize),
    /// Lost the race to finish a round; someone else already completed it
    #[error("round {0} already finished")]
    AlreadyFinished(usize),
    /// Every round of the match has been started
    #[error("all rounds already played")]
    AllRoundsPlayed,
    /// Round content did not become available within the readiness window
    #[error("match initialization timed out")]
    InitializationTimeout,
    /// Content provider exhausted its retries
    #[error("upstream content unavailable: {0}")]
    UpstreamContentFailure(String),
}

impl DomainError {
    pub fn not_found(room_key: impl Into<String>) -> Self {
        Self::NotFound(room_key.into())
    }

    pub fn invalid_state(detail: impl Into<String>) -> Self {
        Self::InvalidState(detail.into())
    }

    pub fn upstream(detail: impl Into<String>) -> Self {
        Self::UpstreamContentFailure(detail.into())
    }

    /// Stable client-facing code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::MatchNotFound,
            Self::RoleFull(_) => ErrorCode::MatchFull,
            Self::CannotReconnect => ErrorCode::CannotReconnect,
            Self::NotAParticipant(_) => ErrorCode::NotAParticipant,
            Self::InvalidState(_) | Self::AlreadyFinished(_) => ErrorCode::InvalidState,
            Self::NoSuchRound(_) => ErrorCode::NoSuchRound,
            Self::AllRoundsPlayed => ErrorCode::AllRoundsPlayed,
            Self::InitializationTimeout => ErrorCode::InitializationTimeout,
            Self::UpstreamContentFailure(_) => ErrorCode::UpstreamContentFailure,
        }
    }

    /// Race losers are expected and must never reach players or error logs.
    pub fn is_race_loss(&self) -> bool {
        matches!(self, Self::AlreadyFinished(_))
    }
}
