//! Payloads produced by the match engine for broadcast and discovery.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::round::{Answer, PlayerAnswer, PublicContent};
use crate::domain::scoring::Winner;
use crate::domain::state::{MatchState, RoomKey};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStartNotice {
    /// 1-based round number
    pub round_index: usize,
    #[serde(flatten)]
    pub content: PublicContent,
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerView {
    pub country_code: String,
    pub country_name: String,
    pub label: String,
    pub correct: bool,
}

impl From<&PlayerAnswer> for AnswerView {
    fn from(value: &PlayerAnswer) -> Self {
        Self {
            country_code: value.answer.country_code.clone(),
            country_name: value.answer.country_name.clone(),
            label: value.answer.label(),
            correct: value.correct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    /// 1-based round number
    pub round_index: usize,
    pub host_answer: Option<AnswerView>,
    pub guest_answer: Option<AnswerView>,
    pub correct_answer: Answer,
    pub host_score: u32,
    pub guest_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEnd {
    pub host_score: u32,
    pub guest_score: u32,
    pub winner: Winner,
}

/// Summary of a room as seen by discovery clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    pub room_key: RoomKey,
    pub state: MatchState,
    pub participant_count: usize,
}

/// Per-round view sent to a reconnecting player. The answer key is only
/// included once the round has finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub round_index: usize,
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
    pub finished: bool,
    pub correct_answer: Option<Answer>,
    pub host_answer: Option<AnswerView>,
    pub guest_answer: Option<AnswerView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub state: MatchState,
    pub current_round: usize,
    pub host_score: u32,
    pub guest_score: u32,
    pub rounds: Vec<RoundView>,
}
