//! Periodic removal of matches that can no longer be played.

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::domain::MatchState;
use crate::services::registry::SessionRegistry;

/// Delete matches that are finished, or that failed to start (content
/// never loaded or not in time), and were created more than the grace
/// period before `now`.
pub fn sweep_once(registry: &SessionRegistry, now: OffsetDateTime) -> usize {
    let grace = registry.timing().finished_grace;
    let expired: Vec<_> = registry
        .snapshot()
        .into_iter()
        .filter(|(_, entry)| {
            let session = entry.session().read();
            let done = session.state() == MatchState::Finished || session.is_content_failed();
            done && now - session.created_at() > grace
        })
        .collect();

    let mut removed = 0;
    for (room_key, entry) in expired {
        // a replacement may have been registered since the snapshot
        if registry.is_current(&room_key, &entry) && registry.delete(&room_key) {
            info!(room_key = %room_key, "[MATCH] Cleaned up expired match");
            removed += 1;
        }
    }
    removed
}

/// Run [`sweep_once`] every `sweep_interval` for the life of the process.
pub fn spawn_sweeper(registry: Arc<SessionRegistry>) -> JoinHandle<()> {
    let interval = registry.timing().sweep_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = sweep_once(&registry, OffsetDateTime::now_utc());
            debug!(removed, remaining = registry.len(), "[MATCH] Cleanup sweep done");
        }
    })
}
