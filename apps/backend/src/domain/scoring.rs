use serde::Serialize;

use crate::domain::round::{Answer, RoundContent};

/// Outcome of a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Host,
    Guest,
    Tie,
}

impl Winner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Winner::Host => "host",
            Winner::Guest => "guest",
            Winner::Tie => "tie",
        }
    }
}

/// Decide the match winner from final scores.
pub fn winner(host_score: u32, guest_score: u32) -> Winner {
    match host_score.cmp(&guest_score) {
        std::cmp::Ordering::Greater => Winner::Host,
        std::cmp::Ordering::Less => Winner::Guest,
        std::cmp::Ordering::Equal => Winner::Tie,
    }
}

/// A guess counts if either the country code or the country name matches.
///
/// Comparison ignores surrounding whitespace and case; empty fields never match.
pub fn is_correct(answer: &Answer, content: &RoundContent) -> bool {
    fields_match(&answer.country_code, &content.country_code)
        || fields_match(&answer.country_name, &content.country_name)
}

fn fields_match(given: &str, expected: &str) -> bool {
    let given = given.trim();
    let expected = expected.trim();
    !given.is_empty() && given.to_lowercase() == expected.to_lowercase()
}
