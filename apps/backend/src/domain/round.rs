use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Challenge for one round as delivered by the content provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundContent {
    pub image_url: String,
    pub coordinates: Coordinates,
    pub country_name: String,
    pub country_code: String,
    #[serde(default)]
    pub contributor: String,
}

impl RoundContent {
    /// The part players may see while the round is running.
    pub fn public_view(&self) -> PublicContent {
        PublicContent {
            image_url: self.image_url.clone(),
            contributor: self.contributor.clone(),
        }
    }

    pub fn correct_answer(&self) -> Answer {
        Answer {
            country_code: self.country_code.clone(),
            country_name: self.country_name.clone(),
        }
    }
}

/// Round content without the answer key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicContent {
    pub image_url: String,
    pub contributor: String,
}

/// A country guess, either submitted by a player or the correct one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub country_code: String,
    #[serde(default)]
    pub country_name: String,
}

impl Answer {
    pub fn new(country_code: impl Into<String>, country_name: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            country_name: country_name.into(),
        }
    }

    /// `"France (FR)"`
    pub fn label(&self) -> String {
        format!("{} ({})", self.country_name, self.country_code)
    }
}

/// An answer recorded for one role in one round.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAnswer {
    pub answer: Answer,
    pub submitted_at: OffsetDateTime,
    /// Only meaningful once the round has finished.
    pub correct: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Round {
    pub content: Option<RoundContent>,
    pub host_answer: Option<PlayerAnswer>,
    pub guest_answer: Option<PlayerAnswer>,
    pub started_at: Option<OffsetDateTime>,
    pub deadline: Option<OffsetDateTime>,
    pub finished: bool,
}

impl Round {
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn both_answered(&self) -> bool {
        self.host_answer.is_some() && self.guest_answer.is_some()
    }

    pub fn deadline_passed(&self, now: OffsetDateTime) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}
