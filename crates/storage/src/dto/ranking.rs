use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Registration;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegistrationInfo {
    pub registration_id: Uuid,
    pub name: String,
    pub is_team: bool,
    pub department: String,
    pub year: i32,
    pub division: String,
}

impl From<&Registration> for RegistrationInfo {
    fn from(registration: &Registration) -> Self {
        Self {
            registration_id: registration.registration_id,
            name: registration.participation.display_name().to_string(),
            is_team: registration.participation.is_team(),
            department: registration.department.clone(),
            year: registration.year,
            division: registration.division.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub registration: RegistrationInfo,
    pub best_score: f64,
    pub best_time: Option<f64>,
    pub furthest_round: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HeatStanding {
    pub position: Option<i32>,
    pub registration: RegistrationInfo,
    pub total_score: f64,
    pub time_taken: Option<f64>,
    pub qualified_for_next: bool,
    pub is_bye: bool,
}

/// Per (department, year, division) totals across an event
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DepartmentStatistics {
    pub department: String,
    pub year: i32,
    pub division: String,
    pub participant_count: i64,
    pub team_count: i64,
    pub average_score: f64,
    pub total_score: f64,
    pub qualified_count: i64,
}

pub fn decimal_to_f64(decimal: Decimal) -> f64 {
    decimal.to_f64().unwrap_or(0.0)
}
