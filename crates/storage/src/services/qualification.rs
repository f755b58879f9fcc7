use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use uuid::Uuid;

use super::scoring::{compute_weighted_score, validate_criteria_scores};
use crate::error::{TournamentError, TournamentResult};
use crate::models::{HeatParticipant, SubEvent};

/// A judge's submission for one registration in a heat.
#[derive(Debug, Clone, Default)]
pub struct RawResult {
    pub registration_id: Uuid,
    pub score: Option<Decimal>,
    pub time_taken: Option<Decimal>,
    pub criteria_scores: Option<BTreeMap<String, Decimal>>,
}

/// A submission after scoring and ranking within its heat.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub registration_id: Uuid,
    pub criteria_scores: BTreeMap<String, Decimal>,
    pub total_score: Decimal,
    pub time_taken: Option<Decimal>,
    pub position: i32,
    pub qualified: bool,
}

/// The submitted registrations must be exactly the heat roster.
///
/// A registration outside the roster is an `InvalidParticipant`; a rostered
/// registration with no result is an `InvalidResult`, so a completed heat
/// always holds one score per entrant.
pub fn ensure_full_roster(
    roster: &[HeatParticipant],
    results: &[RawResult],
) -> TournamentResult<()> {
    let members: HashSet<Uuid> = roster.iter().map(|p| p.registration_id).collect();

    if let Some(outsider) = results
        .iter()
        .find(|result| !members.contains(&result.registration_id))
    {
        return Err(TournamentError::InvalidParticipant(outsider.registration_id));
    }

    let submitted: HashSet<Uuid> = results.iter().map(|r| r.registration_id).collect();
    let missing: Vec<String> = roster
        .iter()
        .filter(|p| !submitted.contains(&p.registration_id))
        .map(|p| p.registration_id.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(TournamentError::InvalidResult(format!(
            "missing results for {} of {} entrants: {}",
            missing.len(),
            roster.len(),
            missing.join(", ")
        )));
    }

    Ok(())
}

/// Scores, orders and qualifies one heat's results.
///
/// Points and elimination formats rank by descending total, timed formats by
/// ascending time. Ties keep submission order. The top
/// `qualifiers_per_group` positions qualify, so a short heat qualifies its
/// whole field.
pub fn rank_results(
    sub_event: &SubEvent,
    results: Vec<RawResult>,
) -> TournamentResult<Vec<RankedResult>> {
    if results.is_empty() {
        return Err(TournamentError::InvalidResult(
            "at least one result is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = results.iter().find(|r| !seen.insert(r.registration_id)) {
        return Err(TournamentError::InvalidResult(format!(
            "duplicate result for registration {}",
            duplicate.registration_id
        )));
    }

    let mut scored = results
        .into_iter()
        .map(|result| score_result(sub_event, result))
        .collect::<TournamentResult<Vec<_>>>()?;

    let timed = sub_event.round_format.is_timed();
    scored.sort_by(|a, b| compare(a, b, timed));

    let qualifiers = sub_event.qualifiers();

    Ok(scored
        .into_iter()
        .enumerate()
        .map(|(idx, mut result)| {
            result.position = idx as i32 + 1;
            result.qualified = idx < qualifiers;
            result
        })
        .collect())
}

fn score_result(sub_event: &SubEvent, result: RawResult) -> TournamentResult<RankedResult> {
    let registration_id = result.registration_id;

    let (criteria_scores, total_score, time_taken) = if sub_event.round_format.is_timed() {
        let time = result.time_taken.ok_or_else(|| {
            TournamentError::InvalidResult(format!(
                "time_taken is required for registration {} in a {} round",
                registration_id, sub_event.round_format
            ))
        })?;
        if time.is_sign_negative() && !time.is_zero() {
            return Err(TournamentError::InvalidResult(format!(
                "time_taken for registration {} is negative",
                registration_id
            )));
        }
        (BTreeMap::new(), result.score.unwrap_or_default(), Some(time))
    } else {
        // One scoring mode per heat: criteria when the sub-event defines any.
        let judged_on_criteria = !sub_event.criteria.is_empty();
        match (judged_on_criteria, result.criteria_scores, result.score) {
            (true, Some(criteria), None) => {
                validate_criteria_scores(&criteria, &sub_event.criteria)?;
                let total = compute_weighted_score(&criteria, &sub_event.criteria);
                (criteria, total, result.time_taken)
            }
            (false, None, Some(score)) => (BTreeMap::new(), score, result.time_taken),
            (true, _, _) => {
                return Err(TournamentError::InvalidResult(format!(
                    "registration {} must be scored with criteria_scores only",
                    registration_id
                )));
            }
            (false, _, _) => {
                return Err(TournamentError::InvalidResult(format!(
                    "registration {} needs a direct score, this sub-event defines no criteria",
                    registration_id
                )));
            }
        }
    };

    Ok(RankedResult {
        registration_id,
        criteria_scores,
        total_score,
        time_taken,
        position: 0,
        qualified: false,
    })
}

fn compare(a: &RankedResult, b: &RankedResult, timed: bool) -> Ordering {
    if timed {
        a.time_taken.cmp(&b.time_taken)
    } else {
        b.total_score.cmp(&a.total_score)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::types::Json;

    use super::*;
    use crate::models::{CriteriaDefinitions, CriterionDefinition, ParticipationMode, RoundFormat};

    fn sub_event(format: RoundFormat, qualifiers: i32) -> SubEvent {
        SubEvent {
            sub_event_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            name: "Heat test".to_string(),
            participation_mode: ParticipationMode::Solo,
            round_format: format,
            participants_per_group: 5,
            qualifiers_per_group: qualifiers,
            current_round: 1,
            total_rounds: 3,
            is_finalized: false,
            criteria: Json(CriteriaDefinitions::from([
                (
                    "technique".to_string(),
                    CriterionDefinition {
                        weight: Decimal::new(6, 1),
                        max_score: Decimal::from(10),
                    },
                ),
                (
                    "expression".to_string(),
                    CriterionDefinition {
                        weight: Decimal::new(4, 1),
                        max_score: Decimal::from(10),
                    },
                ),
            ])),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn unjudged(format: RoundFormat, qualifiers: i32) -> SubEvent {
        let mut event = sub_event(format, qualifiers);
        event.criteria.0.clear();
        event
    }

    fn timed(id: Uuid, seconds: i64) -> RawResult {
        RawResult {
            registration_id: id,
            time_taken: Some(Decimal::from(seconds)),
            ..Default::default()
        }
    }

    fn pointed(id: Uuid, score: i64) -> RawResult {
        RawResult {
            registration_id: id,
            score: Some(Decimal::from(score)),
            ..Default::default()
        }
    }

    #[test]
    fn test_time_format_ranks_ascending() {
        let (one, two, three) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let event = sub_event(RoundFormat::Time, 2);

        let ranked = rank_results(
            &event,
            vec![timed(one, 60), timed(two, 55), timed(three, 58)],
        )
        .unwrap();

        let order: Vec<Uuid> = ranked.iter().map(|r| r.registration_id).collect();
        assert_eq!(order, vec![two, three, one]);
        let positions: Vec<i32> = ranked.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        let qualified: Vec<bool> = ranked.iter().map(|r| r.qualified).collect();
        assert_eq!(qualified, vec![true, true, false]);
    }

    #[test]
    fn test_points_format_ranks_descending() {
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let event = unjudged(RoundFormat::Points, 3);
        let results = ids
            .iter()
            .zip([40, 90, 10, 70, 55])
            .map(|(id, score)| pointed(*id, score))
            .collect();

        let ranked = rank_results(&event, results).unwrap();

        let totals: Vec<Decimal> = ranked.iter().map(|r| r.total_score).collect();
        assert_eq!(
            totals,
            [90i64, 70, 55, 40, 10].map(Decimal::from).to_vec()
        );
        assert_eq!(ranked.iter().filter(|r| r.qualified).count(), 3);
        assert!(ranked[..3].iter().all(|r| r.qualified));
    }

    #[test]
    fn test_ties_keep_submission_order() {
        let (first, second, third) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let event = unjudged(RoundFormat::Elimination, 1);

        let ranked = rank_results(
            &event,
            vec![pointed(first, 50), pointed(second, 50), pointed(third, 70)],
        )
        .unwrap();

        let order: Vec<Uuid> = ranked.iter().map(|r| r.registration_id).collect();
        assert_eq!(order, vec![third, first, second]);
        assert!(ranked[0].qualified);
        assert!(!ranked[1].qualified);
    }

    #[test]
    fn test_short_heat_qualifies_everyone() {
        let event = unjudged(RoundFormat::Points, 3);

        let ranked = rank_results(
            &event,
            vec![pointed(Uuid::new_v4(), 1), pointed(Uuid::new_v4(), 2)],
        )
        .unwrap();

        assert!(ranked.iter().all(|r| r.qualified));
    }

    #[test]
    fn test_criteria_scores_are_weighted() {
        let event = sub_event(RoundFormat::Points, 1);
        let id = Uuid::new_v4();
        let result = RawResult {
            registration_id: id,
            criteria_scores: Some(BTreeMap::from([
                ("technique".to_string(), Decimal::from(10)),
                ("expression".to_string(), Decimal::from(5)),
            ])),
            ..Default::default()
        };

        let ranked = rank_results(&event, vec![result]).unwrap();

        assert_eq!(ranked[0].total_score, Decimal::from(8));
        assert_eq!(ranked[0].criteria_scores.len(), 2);
    }

    #[test]
    fn test_missing_time_rejected() {
        let event = sub_event(RoundFormat::Time, 1);

        let err = rank_results(&event, vec![pointed(Uuid::new_v4(), 10)]).unwrap_err();

        assert!(matches!(err, TournamentError::InvalidResult(_)));
    }

    #[test]
    fn test_duplicate_submission_rejected() {
        let event = unjudged(RoundFormat::Points, 1);
        let id = Uuid::new_v4();

        let err = rank_results(&event, vec![pointed(id, 1), pointed(id, 2)]).unwrap_err();

        assert!(matches!(err, TournamentError::InvalidResult(_)));
    }

    #[test]
    fn test_mixed_scoring_modes_rejected() {
        let event = sub_event(RoundFormat::Points, 1);
        let judged = RawResult {
            registration_id: Uuid::new_v4(),
            criteria_scores: Some(BTreeMap::from([
                ("technique".to_string(), Decimal::from(10)),
                ("expression".to_string(), Decimal::from(10)),
            ])),
            ..Default::default()
        };

        let err = rank_results(&event, vec![judged.clone(), pointed(Uuid::new_v4(), 50)])
            .unwrap_err();
        assert!(matches!(err, TournamentError::InvalidResult(_)));

        let both = RawResult {
            score: Some(Decimal::from(50)),
            ..judged
        };
        assert!(matches!(
            rank_results(&event, vec![both]),
            Err(TournamentError::InvalidResult(_))
        ));
    }

    #[test]
    fn test_criteria_rejected_without_definitions() {
        let event = unjudged(RoundFormat::Elimination, 1);
        let result = RawResult {
            registration_id: Uuid::new_v4(),
            criteria_scores: Some(BTreeMap::from([("technique".to_string(), Decimal::ONE)])),
            ..Default::default()
        };

        let err = rank_results(&event, vec![result]).unwrap_err();

        assert!(matches!(err, TournamentError::InvalidResult(_)));
    }

    #[test]
    fn test_submission_must_match_roster() {
        let heat_id = Uuid::new_v4();
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
        let outsider = Uuid::new_v4();
        let roster = vec![
            HeatParticipant {
                heat_id,
                registration_id: first,
                lane: 1,
            },
            HeatParticipant {
                heat_id,
                registration_id: second,
                lane: 2,
            },
        ];

        assert!(ensure_full_roster(&roster, &[pointed(second, 1), pointed(first, 2)]).is_ok());
        assert!(matches!(
            ensure_full_roster(
                &roster,
                &[pointed(first, 1), pointed(second, 2), pointed(outsider, 3)]
            ),
            Err(TournamentError::InvalidParticipant(id)) if id == outsider
        ));
        assert!(matches!(
            ensure_full_roster(&roster, &[pointed(first, 1)]),
            Err(TournamentError::InvalidResult(_))
        ));
    }
}
