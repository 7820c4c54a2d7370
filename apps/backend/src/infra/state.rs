use std::sync::Arc;

use crate::adapters::GeoApiClient;
use crate::config::{MatchTiming, ServerConfig};
use crate::error::AppError;
use crate::services::ports::{ContentProvider, RoomHashVerifier, RoomUpdatePublisher};
use crate::services::{MatchService, SessionRegistry};
use crate::state::app_state::AppState;
use crate::ws::broker::{LocalPublisher, RealtimeBroker};
use crate::ws::hub::DiscoveryHub;

/// Builder for creating AppState instances (used in both tests and main)
///
/// Collaborators not supplied explicitly are derived from the server
/// config: the geo API client for content and hash verification, and a
/// Redis broker (or the local fallback) for room updates.
pub struct StateBuilder {
    config: Option<ServerConfig>,
    timing: MatchTiming,
    content: Option<Arc<dyn ContentProvider>>,
    verifier: Option<Arc<dyn RoomHashVerifier>>,
    publisher: Option<Arc<dyn RoomUpdatePublisher>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            timing: MatchTiming::default(),
            content: None,
            verifier: None,
            publisher: None,
        }
    }

    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_timing(mut self, timing: MatchTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_content_provider(mut self, content: Arc<dyn ContentProvider>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn RoomHashVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn RoomUpdatePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let discovery = Arc::new(DiscoveryHub::new());

        let geo_api = match (&self.content, &self.verifier, &self.config) {
            (Some(_), Some(_), _) => None,
            (_, _, Some(config)) => Some(Arc::new(GeoApiClient::new(
                &config.geo_api_base_url,
                self.timing.upstream_timeout,
            )?)),
            _ => {
                return Err(AppError::config(
                    "content provider and room verifier require a server config",
                ))
            }
        };

        let content: Arc<dyn ContentProvider> = match (self.content, &geo_api) {
            (Some(content), _) => content,
            (None, Some(client)) => client.clone(),
            (None, None) => return Err(AppError::config("no content provider configured")),
        };
        let verifier: Arc<dyn RoomHashVerifier> = match (self.verifier, &geo_api) {
            (Some(verifier), _) => verifier,
            (None, Some(client)) => client.clone(),
            (None, None) => return Err(AppError::config("no room verifier configured")),
        };

        let redis_url = self.config.as_ref().and_then(|c| c.redis_url.clone());
        let publisher: Arc<dyn RoomUpdatePublisher> = match (self.publisher, redis_url) {
            (Some(publisher), _) => publisher,
            (None, Some(url)) => RealtimeBroker::connect(&url, discovery.clone()).await?,
            (None, None) => Arc::new(LocalPublisher::new(discovery.clone())),
        };

        let registry = Arc::new(SessionRegistry::new(content, self.timing));
        let matches = MatchService::new(registry, publisher);
        Ok(AppState::new(matches, verifier, discovery))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
