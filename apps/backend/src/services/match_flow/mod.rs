//! Match orchestration: bridges session rules with fan-out, scheduling and
//! room update publishing.
//!
//! Session locks are only taken inside synchronous helpers; anything that
//! awaits (readiness, pauses, publishing) runs in spawned tasks that reacquire
//! the lock afterwards.

mod player_actions;
mod round_lifecycle;
mod scheduler;
mod seats;

use std::sync::Arc;

use tracing::warn;

use crate::domain::{Answer, ConnectionHandle, PlayerId, Role, RoomKey};
use crate::errors::DomainError;
use crate::protocol::{AuthOk, ReconnectOk};
use crate::services::ports::RoomUpdatePublisher;
use crate::services::registry::{MatchEntry, SessionRegistry};

/// Player commands accepted by the match engine.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchCommand {
    /// Take a seat, or reclaim one when an identifier is supplied
    Auth { player_id: Option<PlayerId> },
    Reconnect { player_id: PlayerId },
    SubmitAnswer { player_id: PlayerId, answer: Answer },
}

/// Direct reply to the connection that issued a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandReply {
    Joined(AuthOk),
    Reconnected(ReconnectOk),
    AnswerAccepted,
}

#[derive(Clone)]
pub struct MatchService {
    registry: Arc<SessionRegistry>,
    publisher: Arc<dyn RoomUpdatePublisher>,
}

impl MatchService {
    pub fn new(registry: Arc<SessionRegistry>, publisher: Arc<dyn RoomUpdatePublisher>) -> Self {
        Self {
            registry,
            publisher,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Apply one command from `connection` to the match in `room_key`.
    pub fn execute(
        &self,
        room_key: &RoomKey,
        connection: &ConnectionHandle,
        command: MatchCommand,
    ) -> Result<CommandReply, DomainError> {
        match command {
            MatchCommand::Auth { player_id } => self
                .join(room_key, player_id.as_ref(), connection.clone())
                .map(CommandReply::Joined),
            MatchCommand::Reconnect { player_id } => self
                .reconnect(room_key, &player_id, connection.clone())
                .map(CommandReply::Reconnected),
            MatchCommand::SubmitAnswer { player_id, answer } => self
                .submit_answer(room_key, &player_id, answer)
                .map(|()| CommandReply::AnswerAccepted),
        }
    }

    fn require_entry(&self, room_key: &RoomKey) -> Result<Arc<MatchEntry>, DomainError> {
        self.registry
            .get(room_key)
            .ok_or_else(|| DomainError::not_found(room_key.as_str()))
    }

    /// Publish the current room state in the background.
    fn publish_room_state(&self, entry: &Arc<MatchEntry>) {
        let update = entry.session().read().room_state();
        let publisher = self.publisher.clone();
        tokio::spawn(async move {
            if let Err(err) = publisher.publish(&update).await {
                warn!(
                    room_key = %update.room_key,
                    state = %update.state,
                    error = %err,
                    "[MATCH] Failed to publish room state"
                );
            }
        });
    }

    /// Record both player identifiers in the background.
    fn store_players(&self, room_key: &RoomKey, entry: &Arc<MatchEntry>) {
        let (host, guest) = {
            let session = entry.session().read();
            (
                session.player_id(Role::Host).cloned(),
                session.player_id(Role::Guest).cloned(),
            )
        };
        let publisher = self.publisher.clone();
        let room_key = room_key.clone();
        tokio::spawn(async move {
            if let Err(err) = publisher
                .store_players(&room_key, host.as_ref(), guest.as_ref())
                .await
            {
                warn!(room_key = %room_key, error = %err, "[MATCH] Failed to store player ids");
            }
        });
    }
}
