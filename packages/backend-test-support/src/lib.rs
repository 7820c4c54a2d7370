//! Test support utilities shared by the backend's unit and integration tests.
//!
//! Provides unified logging initialization and helpers for generating unique
//! room keys so concurrently running tests never share a match.

pub mod logging;
pub mod unique_helpers;
