#![allow(dead_code)]

// tests/support/mod.rs
pub mod fakes;
pub mod server;

use std::time::Duration;

use geoduel_backend::MatchTiming;

// Logging is auto-installed for every integration test binary
#[ctor::ctor]
fn init_logging() {
    geoduel_test_support::logging::init();
}

/// Timings short enough for a whole match to run in well under a second.
///
/// Rounds are long enough that tests answering promptly never race the
/// scheduler; the timeout suites shorten `round_duration` further.
pub fn fast_timing() -> MatchTiming {
    MatchTiming {
        round_duration: Duration::from_secs(5),
        inter_round_pause: Duration::from_millis(30),
        scheduler_tick: Duration::from_millis(20),
        readiness_timeout: Duration::from_secs(2),
        prefetch_attempts: 2,
        prefetch_backoff: Duration::from_millis(10),
        sweep_interval: Duration::from_secs(60),
        finished_grace: Duration::ZERO,
        upstream_timeout: Duration::from_secs(2),
    }
}

/// Poll `check` until it holds or `timeout` elapses.
pub async fn wait_until<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = tokio::time::Instant::now();
    loop {
        if check() {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
