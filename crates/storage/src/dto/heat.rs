use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Heat, HeatParticipant, HeatStatus, Score};
use crate::services::qualification::RawResult;

/// Heat with its roster
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HeatDetailResponse {
    pub heat_id: Uuid,
    pub sub_event_id: Uuid,
    pub round_number: i32,
    pub heat_number: i32,
    pub status: HeatStatus,
    pub venue: Option<String>,
    pub scheduled_at: Option<NaiveDateTime>,
    pub capacity: i32,
    pub completed_at: Option<NaiveDateTime>,
    pub participants: Vec<HeatParticipant>,
}

impl HeatDetailResponse {
    pub fn new(heat: Heat, participants: Vec<HeatParticipant>) -> Self {
        Self {
            heat_id: heat.heat_id,
            sub_event_id: heat.sub_event_id,
            round_number: heat.round_number,
            heat_number: heat.heat_number,
            status: heat.status,
            venue: heat.venue,
            scheduled_at: heat.scheduled_at,
            capacity: heat.capacity,
            completed_at: heat.completed_at,
            participants,
        }
    }
}

/// Heats created for a round
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateHeatsResponse {
    pub sub_event_id: Uuid,
    pub round_number: i32,
    pub heats: Vec<HeatDetailResponse>,
}

/// One judged result inside a heat
///
/// Timed rounds need `time_taken`; points and elimination rounds need
/// `criteria_scores` or a direct `score`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HeatResultEntry {
    pub registration_id: Uuid,
    pub score: Option<Decimal>,
    pub time_taken: Option<Decimal>,
    pub criteria_scores: Option<BTreeMap<String, Decimal>>,
}

impl From<HeatResultEntry> for RawResult {
    fn from(entry: HeatResultEntry) -> Self {
        Self {
            registration_id: entry.registration_id,
            score: entry.score,
            time_taken: entry.time_taken,
            criteria_scores: entry.criteria_scores,
        }
    }
}

/// Request payload for recording the results of a heat
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordResultsRequest {
    #[validate(length(min = 1, max = 500, message = "Between 1 and 500 results are required"))]
    pub results: Vec<HeatResultEntry>,
}

/// Scores written for a heat
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordResultsResponse {
    pub heat_id: Uuid,
    pub scores: Vec<Score>,
}

/// Request payload for placing a heat at a venue and time
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ScheduleHeatRequest {
    #[validate(length(min = 1, max = 255, message = "Venue must be between 1 and 255 characters"))]
    pub venue: Option<String>,

    pub scheduled_at: Option<NaiveDateTime>,
}
