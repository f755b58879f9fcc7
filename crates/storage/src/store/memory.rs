use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::types::Json;
use uuid::Uuid;

use super::{RoundAdvance, TournamentStore};
use crate::error::{Result, StorageError};
use crate::models::{
    Event, Heat, HeatParticipant, HeatStatus, NewHeat, NewScore, Registration, Score, SubEvent,
};

#[derive(Debug, Default)]
struct State {
    events: Vec<Event>,
    sub_events: Vec<SubEvent>,
    registrations: Vec<Registration>,
    heats: Vec<Heat>,
    participants: Vec<HeatParticipant>,
    scores: Vec<Score>,
}

/// In-process store honouring the same keys and atomicity as Postgres.
///
/// Each write validates everything under the lock before mutating, so a
/// failing call leaves the state untouched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert_event(&self, event: Event) {
        self.state().events.push(event);
    }

    pub fn insert_sub_event(&self, sub_event: SubEvent) {
        self.state().sub_events.push(sub_event);
    }

    pub fn insert_registration(&self, registration: Registration) {
        self.state().registrations.push(registration);
    }

    /// Total number of stored score rows, across all sub-events.
    pub fn score_count(&self) -> usize {
        self.state().scores.len()
    }

    /// Total number of stored heats, across all sub-events.
    pub fn heat_count(&self) -> usize {
        self.state().heats.len()
    }
}

fn upsert_score(scores: &mut Vec<Score>, new: &NewScore, now: NaiveDateTime) -> Score {
    let existing = scores.iter_mut().find(|s| {
        s.sub_event_id == new.sub_event_id
            && s.registration_id == new.registration_id
            && s.round_number == new.round_number
    });

    match existing {
        Some(score) => {
            score.heat_id = new.heat_id;
            score.criteria_scores = Json(new.criteria_scores.clone());
            score.total_score = new.total_score;
            score.position = new.position;
            score.time_taken = new.time_taken;
            score.qualified_for_next = new.qualified_for_next;
            score.is_bye = new.is_bye;
            score.judged_by = new.judged_by.clone();
            score.updated_at = now;
            score.clone()
        }
        None => {
            let score = Score {
                score_id: Uuid::new_v4(),
                sub_event_id: new.sub_event_id,
                registration_id: new.registration_id,
                heat_id: new.heat_id,
                round_number: new.round_number,
                criteria_scores: Json(new.criteria_scores.clone()),
                total_score: new.total_score,
                position: new.position,
                time_taken: new.time_taken,
                qualified_for_next: new.qualified_for_next,
                is_bye: new.is_bye,
                judged_by: new.judged_by.clone(),
                created_at: now,
                updated_at: now,
            };
            scores.push(score.clone());
            score
        }
    }
}

fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

#[async_trait]
impl TournamentStore for MemoryStore {
    async fn find_event(&self, event_id: Uuid) -> Result<Event> {
        self.state()
            .events
            .iter()
            .find(|e| e.event_id == event_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn find_sub_event(&self, sub_event_id: Uuid) -> Result<SubEvent> {
        self.state()
            .sub_events
            .iter()
            .find(|s| s.sub_event_id == sub_event_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_sub_events(&self, event_id: Uuid) -> Result<Vec<SubEvent>> {
        Ok(self
            .state()
            .sub_events
            .iter()
            .filter(|s| s.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn list_registrations(&self, sub_event_id: Uuid) -> Result<Vec<Registration>> {
        Ok(self
            .state()
            .registrations
            .iter()
            .filter(|r| r.sub_event_id == sub_event_id)
            .cloned()
            .collect())
    }

    async fn find_heat(&self, heat_id: Uuid) -> Result<Heat> {
        self.state()
            .heats
            .iter()
            .find(|h| h.heat_id == heat_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_heats(&self, sub_event_id: Uuid, round_number: i32) -> Result<Vec<Heat>> {
        let mut heats: Vec<Heat> = self
            .state()
            .heats
            .iter()
            .filter(|h| h.sub_event_id == sub_event_id && h.round_number == round_number)
            .cloned()
            .collect();
        heats.sort_by_key(|h| h.heat_number);
        Ok(heats)
    }

    async fn heat_roster(&self, heat_id: Uuid) -> Result<Vec<HeatParticipant>> {
        let mut roster: Vec<HeatParticipant> = self
            .state()
            .participants
            .iter()
            .filter(|p| p.heat_id == heat_id)
            .cloned()
            .collect();
        roster.sort_by_key(|p| p.lane);
        Ok(roster)
    }

    async fn list_scores(
        &self,
        sub_event_id: Uuid,
        round_number: Option<i32>,
    ) -> Result<Vec<Score>> {
        Ok(self
            .state()
            .scores
            .iter()
            .filter(|s| s.sub_event_id == sub_event_id)
            .filter(|s| round_number.is_none_or(|round| s.round_number == round))
            .cloned()
            .collect())
    }

    async fn heat_scores(&self, heat_id: Uuid) -> Result<Vec<Score>> {
        Ok(self
            .state()
            .scores
            .iter()
            .filter(|s| s.heat_id == Some(heat_id))
            .cloned()
            .collect())
    }

    async fn create_heats(&self, heats: &[NewHeat], byes: &[NewScore]) -> Result<Vec<Heat>> {
        let mut state = self.state();

        for (idx, new) in heats.iter().enumerate() {
            let clashes_stored = state.heats.iter().any(|h| {
                h.sub_event_id == new.sub_event_id
                    && h.round_number == new.round_number
                    && h.heat_number == new.heat_number
            });
            let clashes_batch = heats[..idx].iter().any(|h| {
                h.sub_event_id == new.sub_event_id
                    && h.round_number == new.round_number
                    && h.heat_number == new.heat_number
            });
            if clashes_stored || clashes_batch {
                return Err(StorageError::ConstraintViolation(format!(
                    "heat {} of round {} already exists",
                    new.heat_number, new.round_number
                )));
            }
        }

        let created_at = now();
        let mut created = Vec::with_capacity(heats.len());

        for new in heats {
            let heat = Heat {
                heat_id: new.heat_id,
                sub_event_id: new.sub_event_id,
                round_number: new.round_number,
                heat_number: new.heat_number,
                status: new.status,
                venue: None,
                scheduled_at: None,
                capacity: new.capacity,
                created_at,
                completed_at: (new.status == HeatStatus::Completed).then_some(created_at),
            };

            for (lane, registration_id) in new.registration_ids.iter().enumerate() {
                state.participants.push(HeatParticipant {
                    heat_id: new.heat_id,
                    registration_id: *registration_id,
                    lane: lane as i32 + 1,
                });
            }

            state.heats.push(heat.clone());
            created.push(heat);
        }

        for bye in byes {
            upsert_score(&mut state.scores, bye, created_at);
        }

        Ok(created)
    }

    async fn record_heat_results(
        &self,
        heat_id: Uuid,
        scores: &[NewScore],
        completed_at: NaiveDateTime,
    ) -> Result<Vec<Score>> {
        let mut state = self.state();

        let heat = state
            .heats
            .iter_mut()
            .find(|h| h.heat_id == heat_id)
            .ok_or(StorageError::NotFound)?;
        heat.status = HeatStatus::Completed;
        heat.completed_at = heat.completed_at.or(Some(completed_at));

        Ok(scores
            .iter()
            .map(|score| upsert_score(&mut state.scores, score, completed_at))
            .collect())
    }

    async fn update_heat_status(&self, heat_id: Uuid, status: HeatStatus) -> Result<Heat> {
        let mut state = self.state();
        let heat = state
            .heats
            .iter_mut()
            .find(|h| h.heat_id == heat_id)
            .ok_or(StorageError::NotFound)?;
        heat.status = status;
        Ok(heat.clone())
    }

    async fn schedule_heat(
        &self,
        heat_id: Uuid,
        venue: Option<String>,
        scheduled_at: Option<NaiveDateTime>,
    ) -> Result<Heat> {
        let mut state = self.state();
        let heat = state
            .heats
            .iter_mut()
            .find(|h| h.heat_id == heat_id)
            .ok_or(StorageError::NotFound)?;
        heat.venue = venue;
        heat.scheduled_at = scheduled_at;
        Ok(heat.clone())
    }

    async fn advance_round(&self, sub_event_id: Uuid, advance: &RoundAdvance) -> Result<SubEvent> {
        let mut state = self.state();

        let sub_event = state
            .sub_events
            .iter_mut()
            .find(|s| s.sub_event_id == sub_event_id)
            .ok_or(StorageError::NotFound)?;
        sub_event.current_round = advance.current_round;
        sub_event.is_finalized = advance.is_finalized;
        let updated = sub_event.clone();

        for registration in state
            .registrations
            .iter_mut()
            .filter(|r| advance.promoted.contains(&r.registration_id))
        {
            registration.current_round = advance.current_round;
        }

        Ok(updated)
    }
}
