use std::sync::Arc;

use time::OffsetDateTime;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::MatchService;
use crate::domain::{MatchState, RoomKey};
use crate::services::registry::MatchEntry;

impl MatchService {
    /// One watcher per playing match; ends rounds whose deadline passed.
    pub(crate) fn spawn_scheduler(&self, room_key: RoomKey, entry: Arc<MatchEntry>) {
        let service = self.clone();
        tokio::spawn(async move {
            service.run_scheduler(room_key, entry).await;
        });
    }

    async fn run_scheduler(self, room_key: RoomKey, entry: Arc<MatchEntry>) {
        let mut ticker = tokio::time::interval(self.registry.timing().scheduler_tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;
        debug!(room_key = %room_key, "[SCHEDULER] Watching match");

        loop {
            ticker.tick().await;

            if !self.registry.is_current(&room_key, &entry) {
                debug!(room_key = %room_key, "[SCHEDULER] Match removed, stopping");
                break;
            }

            let now = OffsetDateTime::now_utc();
            let (state, due) = {
                let session = entry.session().read();
                let due = session
                    .active_round()
                    .is_some_and(|round| !round.finished && round.deadline_passed(now));
                (session.state(), due)
            };

            if state != MatchState::Playing {
                debug!(room_key = %room_key, %state, "[SCHEDULER] Match no longer playing, stopping");
                break;
            }
            if due {
                info!(room_key = %room_key, "[SCHEDULER] Round deadline passed");
                self.complete_round(&room_key, &entry);
            }
        }
    }
}
