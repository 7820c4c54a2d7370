use time::OffsetDateTime;
use tracing::debug;

use super::MatchService;
use crate::domain::{Answer, PlayerId, RoomKey};
use crate::errors::DomainError;

impl MatchService {
    /// Record an answer and complete the round if that was the last one
    /// outstanding. An answer that arrives after the round closed is dropped.
    pub fn submit_answer(
        &self,
        room_key: &RoomKey,
        player_id: &PlayerId,
        answer: Answer,
    ) -> Result<(), DomainError> {
        let entry = self.require_entry(room_key)?;
        let now = OffsetDateTime::now_utc();

        let should_end = {
            let mut session = entry.session().write();
            match session.submit_answer(player_id, answer, now) {
                Ok(role) => {
                    debug!(
                        room_key = %room_key,
                        %role,
                        round = session.current_round(),
                        "[MATCH] Answer recorded"
                    );
                }
                Err(err) if err.is_race_loss() => {
                    debug!(room_key = %room_key, player_id = %player_id, "[MATCH] Late answer ignored");
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
            session.should_end_round(now)
        };

        if should_end {
            self.complete_round(room_key, &entry);
        }
        Ok(())
    }
}
