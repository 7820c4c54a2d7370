use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::MatchService;
use crate::domain::{ConnectionHandle, MatchState, PlayerId, Role, RoomKey};
use crate::errors::DomainError;
use crate::protocol::{AuthOk, ReconnectOk, ServerMsg};
use crate::services::fanout::broadcast;
use crate::services::registry::MatchEntry;

impl MatchService {
    /// Seat a player. Without an identifier the first free role is taken
    /// (host, then guest); with one this is a reconnect.
    ///
    /// When this fills the second seat, match start is kicked off in the
    /// background so the reply is not held up by content readiness.
    pub fn join(
        &self,
        room_key: &RoomKey,
        player_id: Option<&PlayerId>,
        connection: ConnectionHandle,
    ) -> Result<AuthOk, DomainError> {
        let entry = self.require_entry(room_key)?;
        let conn_id = connection.conn_id();

        let (reply, ready_to_start) = {
            let mut session = entry.session().write();
            let (role, player_id) = session.claim_seat(player_id, connection)?;
            let (host_score, guest_score) = session.scores();
            let reply = AuthOk {
                player_id,
                role,
                room_state: session.state(),
                current_round: session.current_round(),
                host_score,
                guest_score,
            };
            let ready = session.state() == MatchState::Waiting && session.participant_count() == 2;
            (reply, ready)
        };

        info!(
            room_key = %room_key,
            role = %reply.role,
            player_id = %reply.player_id,
            %conn_id,
            "[MATCH] Player seated"
        );

        self.store_players(room_key, &entry);
        if ready_to_start {
            self.spawn_match_start(room_key.clone(), entry);
        }
        Ok(reply)
    }

    /// Rebind a known player to a new connection and hand back full state.
    pub fn reconnect(
        &self,
        room_key: &RoomKey,
        player_id: &PlayerId,
        connection: ConnectionHandle,
    ) -> Result<ReconnectOk, DomainError> {
        let entry = self.require_entry(room_key)?;
        let conn_id = connection.conn_id();

        let reply = {
            let mut session = entry.session().write();
            let (role, _) = session.claim_seat(Some(player_id), connection)?;
            ReconnectOk {
                player_id: player_id.clone(),
                role,
                room_state: session.state(),
                game_state: session.view(),
            }
        };

        info!(
            room_key = %room_key,
            role = %reply.role,
            player_id = %player_id,
            %conn_id,
            "[MATCH] Player reconnected"
        );
        Ok(reply)
    }

    /// Clear the connection for `role` if `conn_id` is still the bound one.
    pub fn detach(&self, room_key: &RoomKey, role: Role, conn_id: Uuid) {
        let Some(entry) = self.registry.get(room_key) else {
            return;
        };
        if entry.session().write().detach(role, conn_id) {
            debug!(room_key = %room_key, %role, %conn_id, "[MATCH] Connection detached");
        }
    }

    fn spawn_match_start(&self, room_key: RoomKey, entry: Arc<MatchEntry>) {
        let service = self.clone();
        tokio::spawn(async move {
            service.start_match(&room_key, &entry).await;
        });
    }

    /// `Waiting -> Playing` once content is ready, then round 1.
    ///
    /// Concurrent callers are harmless: only the one that flips the state
    /// starts the first round and the scheduler.
    pub(crate) async fn start_match(&self, room_key: &RoomKey, entry: &Arc<MatchEntry>) {
        let timeout = self.registry.timing().readiness_timeout;
        if let Err(err) = entry.gate().wait(timeout).await {
            warn!(room_key = %room_key, error = %err, "[MATCH] Match could not start");
            // never started, so leave it to the cleanup sweep
            entry.session().write().mark_content_failed();
            broadcast(
                entry.session(),
                &ServerMsg::error(err.code(), err.to_string()),
            );
            return;
        }

        let started = {
            let mut session = entry.session().write();
            match session.begin_playing() {
                Ok(true) => session
                    .start_next_round(time::OffsetDateTime::now_utc())
                    .map(Some),
                Ok(false) => Ok(None),
                Err(err) => Err(err),
            }
        };

        let notice = match started {
            Ok(Some(notice)) => notice,
            Ok(None) => {
                debug!(room_key = %room_key, "[MATCH] Match already playing");
                return;
            }
            Err(err) => {
                warn!(room_key = %room_key, error = %err, "[MATCH] Failed to start match");
                return;
            }
        };

        info!(room_key = %room_key, "[MATCH] Match started");
        self.publish_room_state(entry);
        broadcast(entry.session(), &ServerMsg::RoundStart(notice));
        self.spawn_scheduler(room_key.clone(), entry.clone());
    }
}
