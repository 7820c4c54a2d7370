use std::time::Duration;

/// Number of rounds in every match.
pub const ROUND_COUNT: usize = 5;

/// Every fixed duration the match engine relies on.
///
/// `Default` carries the production values; tests build shortened timings so
/// rounds can time out in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchTiming {
    /// Time players have to answer once a round starts
    pub round_duration: Duration,
    /// Pause between a round result and the next round start
    pub inter_round_pause: Duration,
    /// Wake interval of the round scheduler
    pub scheduler_tick: Duration,
    /// Upper bound on waiting for round content before starting a match
    pub readiness_timeout: Duration,
    /// Fetch attempts per round before prefetch gives up
    pub prefetch_attempts: u32,
    /// Fixed pause between prefetch attempts
    pub prefetch_backoff: Duration,
    /// Interval of the finished-match cleanup sweep
    pub sweep_interval: Duration,
    /// Age after which finished or failed matches are swept
    pub finished_grace: Duration,
    /// Request timeout towards the geo API
    pub upstream_timeout: Duration,
}

impl Default for MatchTiming {
    fn default() -> Self {
        Self {
            round_duration: Duration::from_secs(30),
            inter_round_pause: Duration::from_secs(3),
            scheduler_tick: Duration::from_secs(1),
            readiness_timeout: Duration::from_secs(30),
            prefetch_attempts: 5,
            prefetch_backoff: Duration::from_secs(1),
            sweep_interval: Duration::from_secs(5 * 60),
            finished_grace: Duration::from_secs(10 * 60),
            upstream_timeout: Duration::from_secs(30),
        }
    }
}
