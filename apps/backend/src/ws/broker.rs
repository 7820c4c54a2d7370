//! Room update distribution across processes.
//!
//! With Redis configured, updates go through a pub/sub channel and every
//! process forwards what it receives to its own discovery connections.
//! Without it, [`LocalPublisher`] hands updates straight to the local hub.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::random;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::domain::{PlayerId, RoomKey, RoomState};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::services::ports::RoomUpdatePublisher;
use crate::ws::hub::DiscoveryHub;

pub const ROOM_UPDATES_CHANNEL: &str = "geofinder:room_updates";
const PLAYER_IDS_TTL_SECS: u64 = 10 * 60;

/// Wire format on the room updates channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomUpdateEnvelope {
    RoomState(RoomState),
}

#[derive(Debug, Serialize)]
struct StoredPlayerIds<'a> {
    #[serde(rename = "hostID")]
    host_id: &'a str,
    #[serde(rename = "guestID")]
    guest_id: &'a str,
}

pub fn player_ids_key(room_key: &RoomKey) -> String {
    format!("geofinder:match:{room_key}:players")
}

pub struct RealtimeBroker {
    hub: Arc<DiscoveryHub>,
    publisher: Mutex<ConnectionManager>,
}

impl RealtimeBroker {
    pub async fn connect(redis_url: &str, hub: Arc<DiscoveryHub>) -> Result<Arc<Self>, AppError> {
        let client = Client::open(redis_url).map_err(|err| {
            AppError::config(format!("Invalid REDIS_URL: {err}"))
        })?;

        let manager = ConnectionManager::new(client.clone()).await.map_err(|err| {
            AppError::internal(
                ErrorCode::ConfigError,
                "Unable to initialize Redis connection manager",
                err,
            )
        })?;

        let broker = Arc::new(Self {
            hub: hub.clone(),
            publisher: Mutex::new(manager),
        });

        spawn_subscriber(client, hub);
        info!("[BROKER] Redis room updates enabled");

        Ok(broker)
    }

    pub fn hub(&self) -> Arc<DiscoveryHub> {
        self.hub.clone()
    }

    async fn publish_to_channel(&self, channel: &str, encoded: String) -> Result<(), AppError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let publish_res = {
                let mut publisher = self.publisher.lock().await;
                publisher.publish::<_, _, ()>(channel, encoded.clone()).await
            };

            match publish_res {
                Ok(()) => return Ok(()),
                Err(err) => {
                    let app_err = AppError::internal(
                        ErrorCode::InternalError,
                        "Failed to publish room update to Redis",
                        err,
                    );

                    if attempt >= PUBLISHER_MAX_ATTEMPTS || !is_transient_error(&app_err) {
                        return Err(app_err);
                    }

                    let delay_ms = PUBLISHER_INITIAL_RETRY_DELAY_MS
                        .saturating_mul(2_u64.pow(attempt - 1))
                        .min(PUBLISHER_MAX_RETRY_DELAY_MS);
                    warn!(
                        error = %app_err,
                        attempt,
                        retry_delay_ms = delay_ms,
                        "[BROKER] Redis publish failed, retrying"
                    );
                    sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

#[async_trait]
impl RoomUpdatePublisher for RealtimeBroker {
    async fn publish(&self, update: &RoomState) -> Result<(), AppError> {
        let encoded = serde_json::to_string(&RoomUpdateEnvelope::RoomState(update.clone()))
            .map_err(|err| {
                AppError::internal(
                    ErrorCode::InternalError,
                    "Failed to serialize room update",
                    err,
                )
            })?;
        self.publish_to_channel(ROOM_UPDATES_CHANNEL, encoded).await
    }

    async fn store_players(
        &self,
        room_key: &RoomKey,
        host: Option<&PlayerId>,
        guest: Option<&PlayerId>,
    ) -> Result<(), AppError> {
        let stored = StoredPlayerIds {
            host_id: host.map(PlayerId::as_str).unwrap_or_default(),
            guest_id: guest.map(PlayerId::as_str).unwrap_or_default(),
        };
        let encoded = serde_json::to_string(&stored).map_err(|err| {
            AppError::internal(ErrorCode::InternalError, "Failed to serialize player ids", err)
        })?;

        let mut publisher = self.publisher.lock().await;
        publisher
            .set_ex::<_, _, ()>(player_ids_key(room_key), encoded, PLAYER_IDS_TTL_SECS)
            .await
            .map_err(|err| {
                AppError::internal(ErrorCode::InternalError, "Failed to store player ids", err)
            })
    }
}

/// Process-local fallback used when no Redis is configured.
pub struct LocalPublisher {
    hub: Arc<DiscoveryHub>,
}

impl LocalPublisher {
    pub fn new(hub: Arc<DiscoveryHub>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl RoomUpdatePublisher for LocalPublisher {
    async fn publish(&self, update: &RoomState) -> Result<(), AppError> {
        let delivered = self.hub.broadcast_room_state(update);
        debug!(
            room_key = %update.room_key,
            state = %update.state,
            delivered,
            "[BROKER] Room update delivered locally"
        );
        Ok(())
    }
}

// Subscriber retry configuration (background task)
const INITIAL_RETRY_DELAY_SECS: u64 = 1;
const MAX_RETRY_DELAY_SECS: u64 = 60;
const RETRY_DELAY_MULTIPLIER: f64 = 2.0;
const JITTER_PERCENT: f64 = 0.2;

// Publisher retry configuration
const PUBLISHER_MAX_ATTEMPTS: u32 = 3;
const PUBLISHER_INITIAL_RETRY_DELAY_MS: u64 = 50;
const PUBLISHER_MAX_RETRY_DELAY_MS: u64 = 200;

fn spawn_subscriber(client: Client, hub: Arc<DiscoveryHub>) {
    tokio::spawn(async move {
        run_subscription_loop_with_retry(&client, hub).await;
    });
}

fn is_transient_error(err: &AppError) -> bool {
    if let AppError::Config { .. } = err {
        return false;
    }

    let error_msg = err.to_string().to_lowercase();
    if error_msg.contains("authentication failed") || error_msg.contains("invalid redis_url") {
        return false;
    }

    if let Some(source) = StdError::source(err) {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>() {
            match io_err.kind() {
                std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::Unsupported => {
                    return false
                }
                _ => return true,
            }
        }
    }

    true
}

fn calculate_retry_delay(attempt: u32) -> Duration {
    let base_delay =
        INITIAL_RETRY_DELAY_SECS as f64 * RETRY_DELAY_MULTIPLIER.powi(attempt as i32 - 1);
    let capped_delay = base_delay.min(MAX_RETRY_DELAY_SECS as f64);

    let jitter_range = capped_delay * JITTER_PERCENT;
    let jitter = (random::<f64>() * 2.0 - 1.0) * jitter_range;
    let final_delay = (capped_delay + jitter).max(0.1);

    Duration::from_secs_f64(final_delay)
}

async fn run_subscription_loop_with_retry(client: &Client, hub: Arc<DiscoveryHub>) {
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match run_subscription_loop(client, &hub).await {
            Ok(()) => {
                info!("[BROKER] Redis subscription loop completed normally");
                break;
            }
            Err(err) => {
                if !is_transient_error(&err) {
                    error!(
                        error = %err,
                        attempt,
                        "[BROKER] Redis subscription failed with permanent error, exiting"
                    );
                    break;
                }

                let delay = calculate_retry_delay(attempt);
                warn!(
                    error = %err,
                    attempt,
                    retry_delay_secs = delay.as_secs_f64(),
                    "[BROKER] Redis subscription failed, retrying"
                );
                sleep(delay).await;

                if attempt >= 20 {
                    attempt = 10;
                }
            }
        }
    }
}

async fn run_subscription_loop(client: &Client, hub: &DiscoveryHub) -> Result<(), AppError> {
    let mut pubsub = client.get_async_pubsub().await.map_err(|err| {
        AppError::internal(ErrorCode::ConfigError, "Failed to create Redis pubsub", err)
    })?;

    pubsub.subscribe(ROOM_UPDATES_CHANNEL).await.map_err(|err| {
        AppError::internal(
            ErrorCode::ConfigError,
            format!("Failed to subscribe to Redis channel {ROOM_UPDATES_CHANNEL}"),
            err,
        )
    })?;
    info!(channel = ROOM_UPDATES_CHANNEL, "[BROKER] Redis subscription established");

    let mut stream = pubsub.into_on_message();
    while let Some(msg) = stream.next().await {
        let Ok(payload) = msg.get_payload::<String>() else {
            continue;
        };

        match serde_json::from_str::<RoomUpdateEnvelope>(&payload) {
            Ok(RoomUpdateEnvelope::RoomState(update)) => {
                hub.broadcast_room_state(&update);
            }
            Err(err) => {
                error!(error = %err, "[BROKER] Failed to decode room update payload");
            }
        }
    }

    warn!("[BROKER] Redis subscription stream ended, connection lost");
    Err(AppError::internal(
        ErrorCode::InternalError,
        "Redis subscription stream ended unexpectedly",
        std::io::Error::new(std::io::ErrorKind::ConnectionAborted, "Stream ended"),
    ))
}
