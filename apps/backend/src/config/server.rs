use std::env;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_GEO_API_BASE_URL: &str = "https://geo.api.oof2510.space/";

/// Process-level settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Redis connection URL; `None` keeps room updates process-local
    pub redis_url: Option<String>,
    /// Base URL of the geo API (always ends with `/`)
    pub geo_api_base_url: String,
    /// Browser origins allowed by CORS; empty allows any origin
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Build the config from process environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("BACKEND_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("BACKEND_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                AppError::config(format!("BACKEND_PORT must be a valid port number, got '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };

        let redis_url = lookup("REDIS_URL")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(|raw| normalize_redis_url(&raw));

        let geo_api_base_url = lookup("GEO_API_BASE_URL")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| DEFAULT_GEO_API_BASE_URL.to_string());
        if !geo_api_base_url.starts_with("http://") && !geo_api_base_url.starts_with("https://") {
            return Err(AppError::config(format!(
                "GEO_API_BASE_URL must be an http(s) URL, got '{geo_api_base_url}'"
            )));
        }

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            redis_url,
            geo_api_base_url: with_trailing_slash(geo_api_base_url),
            cors_allowed_origins,
        })
    }
}

/// Deployments commonly hand over a bare `host:port`.
fn normalize_redis_url(raw: &str) -> String {
    if raw.starts_with("redis://") || raw.starts_with("rediss://") {
        raw.to_string()
    } else {
        format!("redis://{raw}")
    }
}

/// Comma-separated list; blanks, `null` and non-http(s) entries are dropped.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(str::to_string)
        .collect()
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
