//! Authoritative state of a single match.
//!
//! `Session` is plain data plus the round lifecycle rules. It has no lock of
//! its own; the registry wraps every session in a `RwLock` and each method
//! here is one critical section. Methods take `now` explicitly so deadlines
//! are deterministic under test.

use std::time::Duration;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::ROUND_COUNT;
use crate::domain::connection::ConnectionHandle;
use crate::domain::notices::{
    AnswerView, GameEnd, GameStateView, RoomState, RoundResult, RoundStartNotice, RoundView,
};
use crate::domain::round::{Answer, PlayerAnswer, Round, RoundContent};
use crate::domain::scoring::{is_correct, winner};
use crate::domain::state::{MatchState, PlayerId, Role, RoomKey};
use crate::errors::DomainError;

#[derive(Debug, Clone, Default)]
struct RoleSlot {
    player_id: Option<PlayerId>,
    connection: Option<ConnectionHandle>,
}

#[derive(Debug)]
pub struct Session {
    room_key: RoomKey,
    state: MatchState,
    host: RoleSlot,
    guest: RoleSlot,
    rounds: [Round; ROUND_COUNT],
    current_round: usize,
    host_score: u32,
    guest_score: u32,
    created_at: OffsetDateTime,
    round_duration: Duration,
    content_failed: bool,
}

impl Session {
    pub fn new(room_key: RoomKey, created_at: OffsetDateTime, round_duration: Duration) -> Self {
        Self {
            room_key,
            state: MatchState::Waiting,
            host: RoleSlot::default(),
            guest: RoleSlot::default(),
            rounds: Default::default(),
            current_round: 0,
            host_score: 0,
            guest_score: 0,
            created_at,
            round_duration,
            content_failed: false,
        }
    }

    pub fn room_key(&self) -> &RoomKey {
        &self.room_key
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    /// Number of rounds started so far (0..=5).
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn scores(&self) -> (u32, u32) {
        (self.host_score, self.guest_score)
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// The round players are currently answering, if any.
    pub fn active_round(&self) -> Option<&Round> {
        self.current_round
            .checked_sub(1)
            .and_then(|idx| self.rounds.get(idx))
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Store prefetched content for a round that has not started yet.
    pub fn install_content(&mut self, index: usize, content: RoundContent) -> Result<(), DomainError> {
        let round = self
            .rounds
            .get_mut(index)
            .ok_or(DomainError::NoSuchRound(index))?;
        if round.is_started() {
            return Err(DomainError::invalid_state(format!(
                "round {} already started",
                index + 1
            )));
        }
        round.content = Some(content);
        Ok(())
    }

    pub fn content_ready(&self) -> bool {
        self.rounds.iter().all(|round| round.content.is_some())
    }

    /// Flag a match that will never start: prefetch gave up, or content was
    /// not ready within the readiness window.
    pub fn mark_content_failed(&mut self) {
        self.content_failed = true;
    }

    pub fn is_content_failed(&self) -> bool {
        self.content_failed
    }

    // ------------------------------------------------------------------
    // Participants
    // ------------------------------------------------------------------

    fn slot(&self, role: Role) -> &RoleSlot {
        match role {
            Role::Host => &self.host,
            Role::Guest => &self.guest,
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut RoleSlot {
        match role {
            Role::Host => &mut self.host,
            Role::Guest => &mut self.guest,
        }
    }

    /// Bind a connection to `role`.
    ///
    /// Without an identifier the slot must be unclaimed and receives a fresh
    /// one. With an identifier it must be the one already stored for the slot.
    /// Either way the previous connection handle for the role is replaced.
    pub fn bind_role(
        &mut self,
        role: Role,
        player_id: Option<&PlayerId>,
        connection: ConnectionHandle,
    ) -> Result<PlayerId, DomainError> {
        let slot = self.slot_mut(role);
        let assigned = match player_id {
            None => {
                if slot.player_id.is_some() {
                    return Err(DomainError::RoleFull(role));
                }
                let fresh = PlayerId::generate();
                slot.player_id = Some(fresh.clone());
                fresh
            }
            Some(requested) => {
                if slot.player_id.as_ref() != Some(requested) {
                    return Err(DomainError::CannotReconnect);
                }
                requested.clone()
            }
        };
        slot.connection = Some(connection);
        Ok(assigned)
    }

    /// Seat a player: reconnect by identifier, or take the first unclaimed
    /// role (host before guest).
    ///
    /// A connection holds at most one role; claiming the other seat from a
    /// connection that is already seated fails with `InvalidState`.
    pub fn claim_seat(
        &mut self,
        player_id: Option<&PlayerId>,
        connection: ConnectionHandle,
    ) -> Result<(Role, PlayerId), DomainError> {
        let role = match player_id {
            Some(id) => self.role_of(id).ok_or(DomainError::CannotReconnect)?,
            None => Role::ALL
                .into_iter()
                .find(|role| self.slot(*role).player_id.is_none())
                .ok_or(DomainError::RoleFull(Role::Guest))?,
        };
        if let Some(bound) = self.role_bound_to(connection.conn_id()) {
            if bound != role {
                return Err(DomainError::invalid_state(format!(
                    "connection already seated as {bound}"
                )));
            }
        }
        let assigned = self.bind_role(role, player_id, connection)?;
        Ok((role, assigned))
    }

    pub fn role_of(&self, player_id: &PlayerId) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|role| self.slot(*role).player_id.as_ref() == Some(player_id))
    }

    pub fn player_id(&self, role: Role) -> Option<&PlayerId> {
        self.slot(role).player_id.as_ref()
    }

    fn role_bound_to(&self, conn_id: Uuid) -> Option<Role> {
        Role::ALL.into_iter().find(|role| {
            self.slot(*role)
                .connection
                .as_ref()
                .is_some_and(|conn| conn.conn_id() == conn_id)
        })
    }

    /// Drop the handle for `role` if it is still the one identified by
    /// `conn_id`. A newer reconnect is left untouched.
    pub fn detach(&mut self, role: Role, conn_id: Uuid) -> bool {
        let slot = self.slot_mut(role);
        if slot
            .connection
            .as_ref()
            .is_some_and(|conn| conn.conn_id() == conn_id)
        {
            slot.connection = None;
            return true;
        }
        false
    }

    /// Number of claimed seats.
    pub fn participant_count(&self) -> usize {
        Role::ALL
            .into_iter()
            .filter(|role| self.slot(*role).player_id.is_some())
            .count()
    }

    /// Bound connections in host, guest order.
    pub fn connections(&self) -> impl Iterator<Item = (Role, &ConnectionHandle)> + '_ {
        Role::ALL
            .into_iter()
            .filter_map(|role| self.slot(role).connection.as_ref().map(|conn| (role, conn)))
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// `Waiting -> Playing`. Returns `false` if the match is already playing.
    pub fn begin_playing(&mut self) -> Result<bool, DomainError> {
        match self.state {
            MatchState::Playing => Ok(false),
            MatchState::Finished => Err(DomainError::invalid_state("match already finished")),
            MatchState::Waiting => {
                if self.participant_count() < 2 {
                    return Err(DomainError::invalid_state("waiting for a second player"));
                }
                if !self.content_ready() {
                    return Err(DomainError::invalid_state("round content not loaded"));
                }
                self.state = MatchState::Playing;
                Ok(true)
            }
        }
    }

    /// `Playing -> Finished`, once. Returns the final standings on the
    /// transition and `None` if the match was not playing.
    pub fn finish(&mut self) -> Option<GameEnd> {
        if self.state != MatchState::Playing {
            return None;
        }
        self.state = MatchState::Finished;
        Some(self.game_end())
    }

    pub fn game_end(&self) -> GameEnd {
        GameEnd {
            host_score: self.host_score,
            guest_score: self.guest_score,
            winner: winner(self.host_score, self.guest_score),
        }
    }

    pub fn room_state(&self) -> RoomState {
        RoomState {
            room_key: self.room_key.clone(),
            state: self.state,
            participant_count: self.participant_count(),
        }
    }

    // ------------------------------------------------------------------
    // Rounds
    // ------------------------------------------------------------------

    /// Activate the next round and advance the round index.
    pub fn start_next_round(&mut self, now: OffsetDateTime) -> Result<RoundStartNotice, DomainError> {
        let index = self.current_round;
        if index >= ROUND_COUNT {
            return Err(DomainError::AllRoundsPlayed);
        }
        if self.state != MatchState::Playing {
            return Err(DomainError::invalid_state(format!(
                "cannot start a round while {}",
                self.state
            )));
        }
        if self.active_round().is_some_and(|round| !round.finished) {
            return Err(DomainError::invalid_state(format!(
                "round {index} is still running"
            )));
        }

        let deadline = now + self.round_duration;
        let round = &mut self.rounds[index];
        let content = round
            .content
            .as_ref()
            .ok_or_else(|| DomainError::invalid_state("round content not loaded"))?
            .public_view();
        round.started_at = Some(now);
        round.deadline = Some(deadline);
        self.current_round += 1;

        Ok(RoundStartNotice {
            round_index: index + 1,
            content,
            deadline,
        })
    }

    /// Record an answer for the active round. Last write wins until the
    /// round finishes.
    pub fn submit_answer(
        &mut self,
        player_id: &PlayerId,
        answer: Answer,
        now: OffsetDateTime,
    ) -> Result<Role, DomainError> {
        if self.state != MatchState::Playing {
            return Err(DomainError::invalid_state(format!(
                "cannot answer while {}",
                self.state
            )));
        }
        let index = self
            .current_round
            .checked_sub(1)
            .filter(|idx| *idx < ROUND_COUNT)
            .ok_or(DomainError::NoSuchRound(self.current_round))?;
        let role = self
            .role_of(player_id)
            .ok_or_else(|| DomainError::NotAParticipant(player_id.to_string()))?;

        let round = &mut self.rounds[index];
        if round.finished {
            return Err(DomainError::AlreadyFinished(index + 1));
        }
        let recorded = Some(PlayerAnswer {
            answer,
            submitted_at: now,
            correct: false,
        });
        match role {
            Role::Host => round.host_answer = recorded,
            Role::Guest => round.guest_answer = recorded,
        }
        Ok(role)
    }

    /// Both players answered, or the deadline passed.
    pub fn should_end_round(&self, now: OffsetDateTime) -> bool {
        self.active_round()
            .is_some_and(|round| round.both_answered() || round.deadline_passed(now))
    }

    /// Score and close the active round. Exactly one caller per round
    /// succeeds; every later caller gets `AlreadyFinished`.
    pub fn end_round(&mut self) -> Result<RoundResult, DomainError> {
        let index = self
            .current_round
            .checked_sub(1)
            .filter(|idx| *idx < ROUND_COUNT)
            .ok_or(DomainError::NoSuchRound(self.current_round))?;
        let round = &mut self.rounds[index];
        if round.finished {
            return Err(DomainError::AlreadyFinished(index + 1));
        }
        let content = round
            .content
            .as_ref()
            .ok_or_else(|| DomainError::invalid_state("round content not loaded"))?;

        let mut host_point = 0;
        let mut guest_point = 0;
        if let Some(answer) = round.host_answer.as_mut() {
            answer.correct = is_correct(&answer.answer, content);
            host_point = u32::from(answer.correct);
        }
        if let Some(answer) = round.guest_answer.as_mut() {
            answer.correct = is_correct(&answer.answer, content);
            guest_point = u32::from(answer.correct);
        }
        round.finished = true;

        let result = RoundResult {
            round_index: index + 1,
            host_answer: round.host_answer.as_ref().map(AnswerView::from),
            guest_answer: round.guest_answer.as_ref().map(AnswerView::from),
            correct_answer: content.correct_answer(),
            host_score: self.host_score + host_point,
            guest_score: self.guest_score + guest_point,
        };
        self.host_score = result.host_score;
        self.guest_score = result.guest_score;
        Ok(result)
    }

    /// Whether any rounds remain after the active one.
    pub fn has_rounds_remaining(&self) -> bool {
        self.current_round < ROUND_COUNT
    }

    /// Full state for a reconnecting player, answer keys only for finished rounds.
    pub fn view(&self) -> GameStateView {
        let rounds = self
            .rounds
            .iter()
            .enumerate()
            .filter(|(_, round)| round.is_started())
            .map(|(idx, round)| {
                let finished = round.finished;
                RoundView {
                    round_index: idx + 1,
                    image_url: round.content.as_ref().map(|c| c.image_url.clone()),
                    deadline: round.deadline,
                    finished,
                    correct_answer: round
                        .content
                        .as_ref()
                        .filter(|_| finished)
                        .map(RoundContent::correct_answer),
                    host_answer: round
                        .host_answer
                        .as_ref()
                        .filter(|_| finished)
                        .map(AnswerView::from),
                    guest_answer: round
                        .guest_answer
                        .as_ref()
                        .filter(|_| finished)
                        .map(AnswerView::from),
                }
            })
            .collect();

        GameStateView {
            state: self.state,
            current_round: self.current_round,
            host_score: self.host_score,
            guest_score: self.guest_score,
            rounds,
        }
    }
}
