//! Process-wide table of live matches.
//!
//! The table lock only guards the map's shape. Callers clone an entry's `Arc`
//! under it and lock the session afterwards, so the two scopes never nest.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::config::MatchTiming;
use crate::domain::{MatchState, RoomKey, RoomState, Session};
use crate::services::ports::ContentProvider;
use crate::services::prefetch::prefetch_rounds;
use crate::services::readiness::ReadinessGate;

/// A registered match: its session and the gate prefetch releases.
#[derive(Debug)]
pub struct MatchEntry {
    session: RwLock<Session>,
    gate: ReadinessGate,
}

impl MatchEntry {
    pub fn new(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
            gate: ReadinessGate::new(),
        }
    }

    pub fn session(&self) -> &RwLock<Session> {
        &self.session
    }

    pub fn gate(&self) -> &ReadinessGate {
        &self.gate
    }
}

pub struct SessionRegistry {
    entries: RwLock<HashMap<RoomKey, Arc<MatchEntry>>>,
    content: Arc<dyn ContentProvider>,
    timing: MatchTiming,
}

impl SessionRegistry {
    pub fn new(content: Arc<dyn ContentProvider>, timing: MatchTiming) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            content,
            timing,
        }
    }

    pub fn timing(&self) -> &MatchTiming {
        &self.timing
    }

    pub fn get(&self, room_key: &RoomKey) -> Option<Arc<MatchEntry>> {
        self.entries.read().get(room_key).cloned()
    }

    /// Return the match for `room_key`, creating it on first reference.
    ///
    /// A new match starts `Waiting` and gets a background prefetch of its
    /// round content. Must be called from within a Tokio runtime.
    pub fn create_if_absent(&self, room_key: &RoomKey) -> Arc<MatchEntry> {
        if let Some(entry) = self.get(room_key) {
            return entry;
        }

        let (entry, created) = {
            let mut entries = self.entries.write();
            match entries.get(room_key) {
                Some(existing) => (existing.clone(), false),
                None => {
                    let session = Session::new(
                        room_key.clone(),
                        OffsetDateTime::now_utc(),
                        self.timing.round_duration,
                    );
                    let entry = Arc::new(MatchEntry::new(session));
                    entries.insert(room_key.clone(), entry.clone());
                    (entry, true)
                }
            }
        };

        if created {
            info!(room_key = %room_key, "[MATCH] Created match, prefetching rounds");
            tokio::spawn(prefetch_rounds(
                room_key.clone(),
                entry.clone(),
                self.content.clone(),
                self.timing,
            ));
        }
        entry
    }

    /// Remove the entry. Bound connections are not notified.
    pub fn delete(&self, room_key: &RoomKey) -> bool {
        let removed = self.entries.write().remove(room_key).is_some();
        if removed {
            debug!(room_key = %room_key, "[MATCH] Removed match from registry");
        }
        removed
    }

    /// Whether `entry` is still the one registered under `room_key`.
    pub fn is_current(&self, room_key: &RoomKey, entry: &Arc<MatchEntry>) -> bool {
        self.entries
            .read()
            .get(room_key)
            .is_some_and(|current| Arc::ptr_eq(current, entry))
    }

    /// Point-in-time copy of every entry.
    pub fn snapshot(&self) -> Vec<(RoomKey, Arc<MatchEntry>)> {
        self.entries
            .read()
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    /// Rooms still waiting for players, sorted by room key. Rooms that can
    /// no longer start are left out.
    pub fn list_waiting(&self) -> Vec<RoomState> {
        let mut rooms: Vec<RoomState> = self
            .snapshot()
            .into_iter()
            .filter_map(|(_, entry)| {
                let session = entry.session().read();
                (session.state() == MatchState::Waiting && !session.is_content_failed())
                    .then(|| session.room_state())
            })
            .collect();
        rooms.sort_by(|a, b| a.room_key.cmp(&b.room_key));
        rooms
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
