use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Event, Heat, HeatParticipant, HeatStatus, NewHeat, NewScore, Registration, Score, SubEvent,
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Round progression written when a sub-event leaves its current round.
#[derive(Debug, Clone)]
pub struct RoundAdvance {
    pub from_round: i32,
    pub current_round: i32,
    pub is_finalized: bool,
    /// Registrations that qualified out of `from_round`.
    pub promoted: Vec<Uuid>,
}

/// Persistence consumed by the tournament engine.
///
/// Multi-row writes (`create_heats`, `record_heat_results`, `advance_round`)
/// are all-or-nothing within one call.
#[async_trait]
pub trait TournamentStore: Send + Sync {
    async fn find_event(&self, event_id: Uuid) -> Result<Event>;

    async fn find_sub_event(&self, sub_event_id: Uuid) -> Result<SubEvent>;

    async fn list_sub_events(&self, event_id: Uuid) -> Result<Vec<SubEvent>>;

    /// Registrations of a sub-event in registration order.
    async fn list_registrations(&self, sub_event_id: Uuid) -> Result<Vec<Registration>>;

    async fn find_heat(&self, heat_id: Uuid) -> Result<Heat>;

    /// Heats of one round ordered by heat number.
    async fn list_heats(&self, sub_event_id: Uuid, round_number: i32) -> Result<Vec<Heat>>;

    /// Roster of a heat ordered by lane.
    async fn heat_roster(&self, heat_id: Uuid) -> Result<Vec<HeatParticipant>>;

    /// Scores of a sub-event, optionally restricted to one round.
    async fn list_scores(&self, sub_event_id: Uuid, round_number: Option<i32>)
    -> Result<Vec<Score>>;

    async fn heat_scores(&self, heat_id: Uuid) -> Result<Vec<Score>>;

    /// Writes heats, their rosters and bye scores.
    ///
    /// A clash on `(sub_event_id, round_number, heat_number)` fails the whole
    /// call with `StorageError::ConstraintViolation`.
    async fn create_heats(&self, heats: &[NewHeat], byes: &[NewScore]) -> Result<Vec<Heat>>;

    /// Upserts scores and marks the heat completed.
    async fn record_heat_results(
        &self,
        heat_id: Uuid,
        scores: &[NewScore],
        completed_at: NaiveDateTime,
    ) -> Result<Vec<Score>>;

    async fn update_heat_status(&self, heat_id: Uuid, status: HeatStatus) -> Result<Heat>;

    async fn schedule_heat(
        &self,
        heat_id: Uuid,
        venue: Option<String>,
        scheduled_at: Option<NaiveDateTime>,
    ) -> Result<Heat>;

    /// Moves the sub-event's round pointer and promotes qualified registrations.
    async fn advance_round(&self, sub_event_id: Uuid, advance: &RoundAdvance) -> Result<SubEvent>;
}
