use std::sync::Arc;

use time::OffsetDateTime;

use crate::services::ports::RoomHashVerifier;
use crate::services::{MatchService, SessionRegistry};
use crate::ws::hub::DiscoveryHub;

/// Shared resources handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    matches: MatchService,
    verifier: Arc<dyn RoomHashVerifier>,
    discovery: Arc<DiscoveryHub>,
    started_at: OffsetDateTime,
}

impl AppState {
    pub fn new(
        matches: MatchService,
        verifier: Arc<dyn RoomHashVerifier>,
        discovery: Arc<DiscoveryHub>,
    ) -> Self {
        Self {
            matches,
            verifier,
            discovery,
            started_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn matches(&self) -> &MatchService {
        &self.matches
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        self.matches.registry()
    }

    pub fn verifier(&self) -> &dyn RoomHashVerifier {
        self.verifier.as_ref()
    }

    pub fn discovery(&self) -> &Arc<DiscoveryHub> {
        &self.discovery
    }

    pub fn started_at(&self) -> OffsetDateTime {
        self.started_at
    }
}
