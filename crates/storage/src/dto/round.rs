use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle of one round of a sub-event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundState {
    Pending,
    HeatsGenerated,
    ResultsRecorded,
    Advanced,
    Finalized,
}

/// Read-only aggregate of a round
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoundSummary {
    pub sub_event_id: Uuid,
    pub round_number: i32,
    pub state: RoundState,
    pub total_heats: usize,
    pub completed_heats: usize,
    pub qualified_participants: usize,
    pub byes: usize,
}
