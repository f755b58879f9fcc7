use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::{TournamentError, TournamentResult};
use crate::models::CriteriaDefinitions;

/// Weighted composite of per-criterion judge inputs.
///
/// Every criterion present in both `criteria_scores` and `definitions`
/// contributes `raw * weight`; anything else contributes nothing. Penalty
/// criteria carry a negative weight, so they subtract through the same sum.
/// No clamping happens here, see [`validate_criteria_scores`].
pub fn compute_weighted_score(
    criteria_scores: &BTreeMap<String, Decimal>,
    definitions: &CriteriaDefinitions,
) -> Decimal {
    criteria_scores
        .iter()
        .filter_map(|(name, raw)| definitions.get(name).map(|def| *raw * def.weight))
        .sum()
}

/// Rejects raw inputs that would skew a weighted total: unknown criteria and
/// values outside `0..=max_score`.
pub fn validate_criteria_scores(
    criteria_scores: &BTreeMap<String, Decimal>,
    definitions: &CriteriaDefinitions,
) -> TournamentResult<()> {
    if definitions.is_empty() {
        return Err(TournamentError::InvalidResult(
            "criteria scores submitted but the sub-event defines no criteria".to_string(),
        ));
    }

    for (name, raw) in criteria_scores {
        let Some(definition) = definitions.get(name) else {
            return Err(TournamentError::InvalidResult(format!(
                "unknown criterion '{}'",
                name
            )));
        };

        if raw.is_sign_negative() && !raw.is_zero() {
            return Err(TournamentError::InvalidResult(format!(
                "criterion '{}' has negative raw score {}",
                name, raw
            )));
        }

        if *raw > definition.max_score {
            return Err(TournamentError::InvalidResult(format!(
                "criterion '{}' score {} exceeds max_score {}",
                name, raw, definition.max_score
            )));
        }
    }

    Ok(())
}

/// Highest composite reachable under `definitions`, penalties at zero.
pub fn max_weighted_score(definitions: &CriteriaDefinitions) -> Decimal {
    definitions
        .values()
        .filter(|def| def.weight.is_sign_positive())
        .map(|def| def.max_score * def.weight)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CriterionDefinition;

    fn def(weight: Decimal, max_score: i64) -> CriterionDefinition {
        CriterionDefinition {
            weight,
            max_score: Decimal::from(max_score),
        }
    }

    fn scores(entries: &[(&str, i64)]) -> BTreeMap<String, Decimal> {
        entries
            .iter()
            .map(|(name, raw)| (name.to_string(), Decimal::from(*raw)))
            .collect()
    }

    #[test]
    fn test_weighted_score_is_linear() {
        let definitions = CriteriaDefinitions::from([
            ("A".to_string(), def(Decimal::new(3, 1), 10)),
            ("B".to_string(), def(Decimal::new(2, 1), 10)),
        ]);

        let total = compute_weighted_score(&scores(&[("A", 5), ("B", 5)]), &definitions);

        assert_eq!(total, Decimal::new(25, 1));
    }

    #[test]
    fn test_missing_criteria_contribute_nothing() {
        let definitions = CriteriaDefinitions::from([
            ("creativity".to_string(), def(Decimal::new(5, 1), 10)),
            ("execution".to_string(), def(Decimal::new(5, 1), 10)),
        ]);

        let total = compute_weighted_score(&scores(&[("creativity", 8)]), &definitions);

        assert_eq!(total, Decimal::from(4));
    }

    #[test]
    fn test_negative_weight_subtracts_penalty() {
        let definitions = CriteriaDefinitions::from([
            ("content".to_string(), def(Decimal::ONE, 10)),
            ("Negative Marking".to_string(), def(Decimal::from(-2), 5)),
        ]);

        let total = compute_weighted_score(
            &scores(&[("content", 9), ("Negative Marking", 2)]),
            &definitions,
        );

        assert_eq!(total, Decimal::from(5));
    }

    #[test]
    fn test_unknown_criteria_ignored_by_computation() {
        let definitions = CriteriaDefinitions::from([("A".to_string(), def(Decimal::ONE, 10))]);

        let total = compute_weighted_score(&scores(&[("A", 3), ("Z", 100)]), &definitions);

        assert_eq!(total, Decimal::from(3));
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let definitions = CriteriaDefinitions::from([("A".to_string(), def(Decimal::ONE, 10))]);

        assert!(validate_criteria_scores(&scores(&[("A", 10)]), &definitions).is_ok());
        assert!(matches!(
            validate_criteria_scores(&scores(&[("A", 11)]), &definitions),
            Err(TournamentError::InvalidResult(_))
        ));
        assert!(matches!(
            validate_criteria_scores(&scores(&[("A", -1)]), &definitions),
            Err(TournamentError::InvalidResult(_))
        ));
    }

    #[test]
    fn test_validation_rejects_unknown_criterion() {
        let definitions = CriteriaDefinitions::from([("A".to_string(), def(Decimal::ONE, 10))]);

        let err = validate_criteria_scores(&scores(&[("B", 1)]), &definitions).unwrap_err();

        assert!(err.to_string().contains("unknown criterion"));
    }

    #[test]
    fn test_max_weighted_score_ignores_penalties() {
        let definitions = CriteriaDefinitions::from([
            ("A".to_string(), def(Decimal::new(5, 1), 10)),
            ("B".to_string(), def(Decimal::new(5, 1), 20)),
            ("penalty".to_string(), def(Decimal::from(-1), 5)),
        ]);

        assert_eq!(max_weighted_score(&definitions), Decimal::from(15));
    }
}
