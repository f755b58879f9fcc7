use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{TournamentError, TournamentResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "participation_mode", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipationMode {
    Solo,
    Group,
}

impl fmt::Display for ParticipationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Solo => "SOLO",
            Self::Group => "GROUP",
        })
    }
}

/// How results inside a heat are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "round_format", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundFormat {
    Elimination,
    Points,
    Time,
}

impl RoundFormat {
    /// Timed formats rank by ascending `time_taken` instead of descending score.
    pub fn is_timed(&self) -> bool {
        matches!(self, Self::Time)
    }
}

impl fmt::Display for RoundFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Elimination => "ELIMINATION",
            Self::Points => "POINTS",
            Self::Time => "TIME",
        };
        f.write_str(label)
    }
}

/// One weighted judging dimension.
///
/// A negative `weight` marks a penalty criterion: the raw value is a penalty
/// magnitude and is subtracted from the total by the ordinary multiply-and-sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CriterionDefinition {
    pub weight: Decimal,
    pub max_score: Decimal,
}

pub type CriteriaDefinitions = BTreeMap<String, CriterionDefinition>;

/// Competitive unit of an event, holding heat capacity and round progression.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SubEvent {
    pub sub_event_id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub participation_mode: ParticipationMode,
    pub round_format: RoundFormat,
    pub participants_per_group: i32,
    pub qualifiers_per_group: i32,
    pub current_round: i32,
    pub total_rounds: i32,
    pub is_finalized: bool,
    #[schema(value_type = Object)]
    pub criteria: Json<CriteriaDefinitions>,
    pub created_at: chrono::NaiveDateTime,
}

impl SubEvent {
    /// Checks the capacity, qualifier and round invariants.
    pub fn validate(&self) -> TournamentResult<()> {
        if self.participants_per_group < 1 {
            return Err(TournamentError::Configuration(format!(
                "participants_per_group must be >= 1, got {}",
                self.participants_per_group
            )));
        }

        if self.qualifiers_per_group < 1 {
            return Err(TournamentError::Configuration(format!(
                "qualifiers_per_group must be >= 1, got {}",
                self.qualifiers_per_group
            )));
        }

        if self.qualifiers_per_group > self.participants_per_group {
            return Err(TournamentError::Configuration(format!(
                "qualifiers_per_group ({}) exceeds participants_per_group ({})",
                self.qualifiers_per_group, self.participants_per_group
            )));
        }

        if self.total_rounds < 1 {
            return Err(TournamentError::Configuration(
                "total_rounds must be >= 1".to_string(),
            ));
        }

        if self.current_round < 1 || self.current_round > self.total_rounds {
            return Err(TournamentError::Configuration(format!(
                "current_round {} is outside 1..={}",
                self.current_round, self.total_rounds
            )));
        }

        if let Some((name, _)) = self
            .criteria
            .iter()
            .find(|(_, def)| def.max_score <= Decimal::ZERO)
        {
            return Err(TournamentError::Configuration(format!(
                "criterion '{}' must have a positive max_score",
                name
            )));
        }

        Ok(())
    }

    pub fn is_last_round(&self) -> bool {
        self.current_round >= self.total_rounds
    }

    pub fn capacity(&self) -> usize {
        self.participants_per_group.max(1) as usize
    }

    pub fn qualifiers(&self) -> usize {
        self.qualifiers_per_group.max(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub_event(per_group: i32, qualifiers: i32) -> SubEvent {
        SubEvent {
            sub_event_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            name: "Sprint".to_string(),
            participation_mode: ParticipationMode::Solo,
            round_format: RoundFormat::Points,
            participants_per_group: per_group,
            qualifiers_per_group: qualifiers,
            current_round: 1,
            total_rounds: 2,
            is_finalized: false,
            criteria: Json(CriteriaDefinitions::new()),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_valid_configuration() {
        assert!(sub_event(5, 3).validate().is_ok());
        assert!(sub_event(4, 4).validate().is_ok());
    }

    #[test]
    fn test_qualifiers_exceeding_capacity_rejected() {
        let err = sub_event(3, 5).validate().unwrap_err();
        assert!(matches!(err, TournamentError::Configuration(_)));
    }

    #[test]
    fn test_current_round_out_of_range_rejected() {
        let mut event = sub_event(5, 3);
        event.current_round = 3;
        assert!(matches!(
            event.validate(),
            Err(TournamentError::Configuration(_))
        ));
    }

    #[test]
    fn test_non_positive_max_score_rejected() {
        let mut event = sub_event(5, 3);
        event.criteria.0.insert(
            "style".to_string(),
            CriterionDefinition {
                weight: Decimal::ONE,
                max_score: Decimal::ZERO,
            },
        );
        assert!(matches!(
            event.validate(),
            Err(TournamentError::Configuration(_))
        ));
    }
}
