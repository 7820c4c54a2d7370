use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::{MatchTiming, ROUND_COUNT};
use crate::domain::{RoomKey, RoundContent};
use crate::error::AppError;
use crate::services::ports::ContentProvider;
use crate::services::registry::MatchEntry;

/// Load content for every round, then release the entry's readiness gate.
///
/// Each round gets `prefetch_attempts` tries with a fixed backoff. If any
/// round exhausts them the session is marked failed and the gate is released
/// as failed, so the match never starts and the sweep collects it.
pub(crate) async fn prefetch_rounds(
    room_key: RoomKey,
    entry: Arc<MatchEntry>,
    provider: Arc<dyn ContentProvider>,
    timing: MatchTiming,
) {
    for index in 0..ROUND_COUNT {
        let content = match fetch_with_retry(provider.as_ref(), &timing).await {
            Ok(content) => content,
            Err(err) => {
                error!(
                    room_key = %room_key,
                    round = index + 1,
                    error = %err,
                    "[MATCH] Prefetch exhausted retries"
                );
                entry.session().write().mark_content_failed();
                entry.gate().release_failed(err.detail());
                return;
            }
        };

        if let Err(err) = entry.session().write().install_content(index, content) {
            warn!(room_key = %room_key, round = index + 1, error = %err, "[MATCH] Discarded prefetched content");
        }
        debug!(room_key = %room_key, round = index + 1, "[MATCH] Round content loaded");
    }

    info!(room_key = %room_key, "[MATCH] All rounds prefetched");
    entry.gate().release_ready();
}

async fn fetch_with_retry(
    provider: &dyn ContentProvider,
    timing: &MatchTiming,
) -> Result<RoundContent, AppError> {
    let attempts = timing.prefetch_attempts.max(1);
    let mut attempt = 1;
    loop {
        match provider.fetch().await {
            Ok(content) => return Ok(content),
            Err(err) if attempt < attempts => {
                warn!(attempt, max_attempts = attempts, error = %err, "[MATCH] Content fetch failed, retrying");
                attempt += 1;
                tokio::time::sleep(timing.prefetch_backoff).await;
            }
            Err(err) => return Err(err),
        }
    }
}
