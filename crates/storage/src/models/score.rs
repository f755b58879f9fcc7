use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

/// Result of one registration in one round.
///
/// Unique on `(sub_event_id, registration_id, round_number)`; re-scoring the
/// same round overwrites the row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Score {
    pub score_id: Uuid,
    pub sub_event_id: Uuid,
    pub registration_id: Uuid,
    pub heat_id: Option<Uuid>,
    pub round_number: i32,
    #[schema(value_type = Object)]
    pub criteria_scores: Json<BTreeMap<String, Decimal>>,
    pub total_score: Decimal,
    pub position: Option<i32>,
    pub time_taken: Option<Decimal>,
    pub qualified_for_next: bool,
    pub is_bye: bool,
    pub judged_by: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

/// Upsert payload for a score, keyed by sub-event, registration and round.
#[derive(Debug, Clone)]
pub struct NewScore {
    pub sub_event_id: Uuid,
    pub registration_id: Uuid,
    pub heat_id: Option<Uuid>,
    pub round_number: i32,
    pub criteria_scores: BTreeMap<String, Decimal>,
    pub total_score: Decimal,
    pub position: Option<i32>,
    pub time_taken: Option<Decimal>,
    pub qualified_for_next: bool,
    pub is_bye: bool,
    pub judged_by: Option<String>,
}

impl NewScore {
    /// Automatic advance for an entrant left alone in a heat.
    pub fn bye(sub_event_id: Uuid, registration_id: Uuid, heat_id: Uuid, round_number: i32) -> Self {
        Self {
            sub_event_id,
            registration_id,
            heat_id: Some(heat_id),
            round_number,
            criteria_scores: BTreeMap::new(),
            total_score: Decimal::ZERO,
            position: Some(1),
            time_taken: None,
            qualified_for_next: true,
            is_bye: true,
            judged_by: None,
        }
    }
}
