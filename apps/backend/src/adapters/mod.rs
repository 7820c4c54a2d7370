//! Clients for services outside this process.

pub mod geo_api;

pub use geo_api::GeoApiClient;
