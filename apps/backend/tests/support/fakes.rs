// In-memory collaborators for the match engine

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use geoduel_backend::domain::{Coordinates, PlayerId, RoomKey, RoomState, RoundContent};
use geoduel_backend::services::ports::{ContentProvider, RoomHashVerifier, RoomUpdatePublisher};
use geoduel_backend::AppError;
use parking_lot::Mutex;

pub fn content(code: &str, name: &str) -> RoundContent {
    RoundContent {
        image_url: format!("https://img.test/{}.jpg", code.to_lowercase()),
        coordinates: Coordinates { lat: 1.0, lon: 2.0 },
        country_name: name.to_string(),
        country_code: code.to_string(),
        contributor: "tester".to_string(),
    }
}

/// Hands out the same challenge for every round, optionally failing the
/// first `failures` fetches.
pub struct StaticContent {
    content: RoundContent,
    failures_left: AtomicU32,
    fetches: AtomicUsize,
}

impl StaticContent {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            content: content(code, name),
            failures_left: AtomicU32::new(0),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn failing_first(mut self, failures: u32) -> Self {
        self.failures_left = AtomicU32::new(failures);
        self
    }

    /// Never succeeds.
    pub fn always_failing() -> Self {
        Self::new("FR", "France").failing_first(u32::MAX)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentProvider for StaticContent {
    async fn fetch(&self) -> Result<RoundContent, AppError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(AppError::upstream(
                "geo api unavailable",
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            ));
        }
        Ok(self.content.clone())
    }
}

/// Accepts only the listed room hashes.
pub struct AllowList(HashSet<String>);

impl AllowList {
    pub fn new<I, S>(hashes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(hashes.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl RoomHashVerifier for AllowList {
    async fn verify(&self, room_hash: &str) -> Result<bool, AppError> {
        Ok(self.0.contains(room_hash))
    }
}

/// Keeps every room update and player registration it receives.
#[derive(Default)]
pub struct RecordingPublisher {
    updates: Mutex<Vec<RoomState>>,
    players: Mutex<Vec<(RoomKey, Option<PlayerId>, Option<PlayerId>)>>,
}

impl RecordingPublisher {
    pub fn updates(&self) -> Vec<RoomState> {
        self.updates.lock().clone()
    }

    pub fn updates_for(&self, room_key: &RoomKey) -> Vec<RoomState> {
        self.updates
            .lock()
            .iter()
            .filter(|update| &update.room_key == room_key)
            .cloned()
            .collect()
    }

    pub fn stored_players(&self, room_key: &RoomKey) -> Option<(Option<PlayerId>, Option<PlayerId>)> {
        self.players
            .lock()
            .iter()
            .rev()
            .find(|(key, _, _)| key == room_key)
            .map(|(_, host, guest)| (host.clone(), guest.clone()))
    }
}

#[async_trait]
impl RoomUpdatePublisher for RecordingPublisher {
    async fn publish(&self, update: &RoomState) -> Result<(), AppError> {
        self.updates.lock().push(update.clone());
        Ok(())
    }

    async fn store_players(
        &self,
        room_key: &RoomKey,
        host: Option<&PlayerId>,
        guest: Option<&PlayerId>,
    ) -> Result<(), AppError> {
        self.players
            .lock()
            .push((room_key.clone(), host.cloned(), guest.cloned()));
        Ok(())
    }
}

/// Never answers, so readiness can only time out.
pub struct StalledContent;

#[async_trait]
impl ContentProvider for StalledContent {
    async fn fetch(&self) -> Result<RoundContent, AppError> {
        std::future::pending().await
    }
}
