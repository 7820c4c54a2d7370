//! Helpers for generating unique test data
//!
//! Room keys are built from ULIDs so that tests running in parallel against
//! the same registry never collide.

use ulid::Ulid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use geoduel_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("room");
/// let id2 = unique_str("room");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("room-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a unique room hash for a test match.
///
/// # Examples
/// ```
/// use geoduel_test_support::unique_helpers::unique_room_hash;
///
/// let hash = unique_room_hash("duel");
/// assert!(hash.starts_with("duel-"));
/// ```
pub fn unique_room_hash(test_name: &str) -> String {
    unique_str(test_name).to_lowercase()
}
