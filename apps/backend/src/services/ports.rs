//! Collaborators the match engine depends on but does not implement.

use async_trait::async_trait;

use crate::domain::{PlayerId, RoomKey, RoomState, RoundContent};
use crate::error::AppError;

/// Source of round challenges. Callers retry; implementations should not.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn fetch(&self) -> Result<RoundContent, AppError>;
}

/// Confirms that a room hash was issued by the lobby service.
#[async_trait]
pub trait RoomHashVerifier: Send + Sync {
    async fn verify(&self, room_hash: &str) -> Result<bool, AppError>;
}

/// Sink for room lifecycle updates consumed by discovery clients.
#[async_trait]
pub trait RoomUpdatePublisher: Send + Sync {
    async fn publish(&self, update: &RoomState) -> Result<(), AppError>;

    /// Record the player identifiers bound to a room. Best effort.
    async fn store_players(
        &self,
        _room_key: &RoomKey,
        _host: Option<&PlayerId>,
        _guest: Option<&PlayerId>,
    ) -> Result<(), AppError> {
        Ok(())
    }
}
