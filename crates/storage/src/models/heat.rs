use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "heat_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeatStatus {
    Pending,
    InProgress,
    Completed,
}

impl fmt::Display for HeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        };
        f.write_str(label)
    }
}

/// One group of co-competing registrations within a round.
///
/// Unique on `(sub_event_id, round_number, heat_number)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Heat {
    pub heat_id: Uuid,
    pub sub_event_id: Uuid,
    pub round_number: i32,
    pub heat_number: i32,
    pub status: HeatStatus,
    pub venue: Option<String>,
    pub scheduled_at: Option<chrono::NaiveDateTime>,
    pub capacity: i32,
    pub created_at: chrono::NaiveDateTime,
    pub completed_at: Option<chrono::NaiveDateTime>,
}

impl Heat {
    pub fn is_completed(&self) -> bool {
        self.status == HeatStatus::Completed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct HeatParticipant {
    pub heat_id: Uuid,
    pub registration_id: Uuid,
    pub lane: i32,
}

/// A heat about to be written, with its roster in lane order.
#[derive(Debug, Clone)]
pub struct NewHeat {
    pub heat_id: Uuid,
    pub sub_event_id: Uuid,
    pub round_number: i32,
    pub heat_number: i32,
    pub capacity: i32,
    pub status: HeatStatus,
    pub registration_ids: Vec<Uuid>,
}
