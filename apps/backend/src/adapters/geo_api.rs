//! HTTP client for the geo API: round images and room hash verification.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::domain::RoundContent;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::services::ports::{ContentProvider, RoomHashVerifier};

#[derive(Clone)]
pub struct GeoApiClient {
    client: Client,
    /// Always ends with `/`
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct VerifyHashResponse {
    ok: bool,
}

impl GeoApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            AppError::internal(
                ErrorCode::ConfigError,
                "failed to build geo api http client",
                err,
            )
        })?;

        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ContentProvider for GeoApiClient {
    async fn fetch(&self) -> Result<RoundContent, AppError> {
        let content: RoundContent = self
            .client
            .get(self.endpoint("getImage"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(country_code = %content.country_code, "[GEO API] Fetched round image");
        Ok(content)
    }
}

#[async_trait]
impl RoomHashVerifier for GeoApiClient {
    async fn verify(&self, room_hash: &str) -> Result<bool, AppError> {
        let response: VerifyHashResponse = self
            .client
            .get(self.endpoint("1v1/verify"))
            .query(&[("hash", room_hash)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.ok)
    }
}
