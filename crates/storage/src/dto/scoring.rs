use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Raw criterion scores to run through a sub-event's weighting
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ScorePreviewRequest {
    #[validate(length(min = 1, message = "At least one criterion score is required"))]
    pub criteria_scores: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScorePreviewResponse {
    pub sub_event_id: Uuid,
    pub total_score: Decimal,
    pub max_possible: Decimal,
}
