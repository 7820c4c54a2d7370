use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::MatchService;
use crate::domain::RoomKey;
use crate::protocol::ServerMsg;
use crate::services::fanout::broadcast;
use crate::services::registry::MatchEntry;

impl MatchService {
    /// Close the active round and move on: next round after the pause, or
    /// the end of the match.
    ///
    /// Both the submit path and the scheduler call this; only the caller
    /// that actually ends the round continues past the first step.
    pub(crate) fn complete_round(&self, room_key: &RoomKey, entry: &Arc<MatchEntry>) {
        let (result, rounds_remaining) = {
            let mut session = entry.session().write();
            match session.end_round() {
                Ok(result) => (result, session.has_rounds_remaining()),
                Err(err) if err.is_race_loss() => {
                    debug!(room_key = %room_key, "[MATCH] Round already completed by another trigger");
                    return;
                }
                Err(err) => {
                    warn!(room_key = %room_key, error = %err, "[MATCH] Could not end round");
                    return;
                }
            }
        };

        info!(
            room_key = %room_key,
            round = result.round_index,
            host_score = result.host_score,
            guest_score = result.guest_score,
            "[MATCH] Round finished"
        );
        broadcast(entry.session(), &ServerMsg::RoundResult(result));

        if rounds_remaining {
            let service = self.clone();
            let room_key = room_key.clone();
            let entry = entry.clone();
            let pause = self.registry.timing().inter_round_pause;
            tokio::spawn(async move {
                tokio::time::sleep(pause).await;
                service.advance_round(&room_key, &entry);
            });
        } else {
            self.finish_match(room_key, entry);
        }
    }

    /// Start the next round unless the match went away during the pause.
    pub(crate) fn advance_round(&self, room_key: &RoomKey, entry: &Arc<MatchEntry>) {
        if !self.registry.is_current(room_key, entry) {
            debug!(room_key = %room_key, "[MATCH] Match removed before next round");
            return;
        }

        let started = entry
            .session()
            .write()
            .start_next_round(OffsetDateTime::now_utc());
        match started {
            Ok(notice) => {
                info!(room_key = %room_key, round = notice.round_index, "[MATCH] Round started");
                broadcast(entry.session(), &ServerMsg::RoundStart(notice));
            }
            Err(err) => {
                debug!(room_key = %room_key, error = %err, "[MATCH] Next round not started");
            }
        }
    }

    /// `Playing -> Finished`; announces the winner and publishes the change.
    pub(crate) fn finish_match(&self, room_key: &RoomKey, entry: &Arc<MatchEntry>) {
        let Some(game_end) = entry.session().write().finish() else {
            return;
        };

        info!(
            room_key = %room_key,
            host_score = game_end.host_score,
            guest_score = game_end.guest_score,
            winner = game_end.winner.as_str(),
            "[MATCH] Match finished"
        );
        broadcast(entry.session(), &ServerMsg::GameEnd(game_end));
        self.publish_room_state(entry);
    }
}
