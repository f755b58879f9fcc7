use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;
use uuid::Uuid;

use super::TournamentService;
use crate::dto::ranking::{
    DepartmentStatistics, HeatStanding, LeaderboardEntry, RegistrationInfo, decimal_to_f64,
};
use crate::error::TournamentResult;
use crate::models::{Registration, Score, SubEvent};
use crate::store::TournamentStore;

struct Standing<'a> {
    registration: &'a Registration,
    best_score: Decimal,
    best_time: Option<Decimal>,
    furthest_round: i32,
}

/// Ranks every registration with at least one judged (non-bye) score.
///
/// Timed sub-events order by fastest time, others by best total. Equal
/// standings keep registration order.
pub fn build_leaderboard(
    sub_event: &SubEvent,
    registrations: &[Registration],
    scores: &[Score],
) -> Vec<LeaderboardEntry> {
    let mut standings: Vec<Standing<'_>> = registrations
        .iter()
        .filter_map(|registration| {
            let own: Vec<&Score> = scores
                .iter()
                .filter(|s| s.registration_id == registration.registration_id)
                .collect();
            let judged: Vec<&Score> = own.iter().copied().filter(|s| !s.is_bye).collect();

            let best_score = judged.iter().map(|s| s.total_score).max()?;

            Some(Standing {
                registration,
                best_score,
                best_time: judged.iter().filter_map(|s| s.time_taken).min(),
                furthest_round: own.iter().map(|s| s.round_number).max().unwrap_or(1),
            })
        })
        .collect();

    if sub_event.round_format.is_timed() {
        standings.sort_by(|a, b| match (a.best_time, b.best_time) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    } else {
        standings.sort_by(|a, b| b.best_score.cmp(&a.best_score));
    }

    standings
        .into_iter()
        .enumerate()
        .map(|(idx, standing)| LeaderboardEntry {
            rank: idx as i64 + 1,
            registration: RegistrationInfo::from(standing.registration),
            best_score: decimal_to_f64(standing.best_score),
            best_time: standing.best_time.map(decimal_to_f64),
            furthest_round: standing.furthest_round,
        })
        .collect()
}

/// Scores of one heat ordered by finishing position; unplaced rows last.
pub fn build_heat_standings(
    registrations: &[Registration],
    mut scores: Vec<Score>,
) -> Vec<HeatStanding> {
    let by_id: HashMap<Uuid, &Registration> = registrations
        .iter()
        .map(|r| (r.registration_id, r))
        .collect();

    scores.sort_by_key(|s| s.position.unwrap_or(i32::MAX));

    scores
        .into_iter()
        .filter_map(|score| {
            let registration = by_id.get(&score.registration_id)?;
            Some(HeatStanding {
                position: score.position,
                registration: RegistrationInfo::from(*registration),
                total_score: decimal_to_f64(score.total_score),
                time_taken: score.time_taken.map(decimal_to_f64),
                qualified_for_next: score.qualified_for_next,
                is_bye: score.is_bye,
            })
        })
        .collect()
}

#[derive(Default)]
struct DepartmentTotals {
    participant_count: i64,
    team_count: i64,
    score_total: Decimal,
    scored: i64,
    qualified: HashSet<Uuid>,
}

/// Groups approved registrations by department, year and division.
///
/// Team registrations count every member towards `participant_count`.
/// Averages cover judged scores only.
pub fn aggregate_departments(
    registrations: &[Registration],
    scores: &[Score],
) -> Vec<DepartmentStatistics> {
    let mut groups: BTreeMap<(String, i32, String), DepartmentTotals> = BTreeMap::new();

    for registration in registrations.iter().filter(|r| r.is_eligible()) {
        let totals = groups
            .entry((
                registration.department.clone(),
                registration.year,
                registration.division.clone(),
            ))
            .or_default();

        totals.participant_count += registration.participation.head_count() as i64;
        if registration.participation.is_team() {
            totals.team_count += 1;
        }

        for score in scores
            .iter()
            .filter(|s| s.registration_id == registration.registration_id)
        {
            if score.qualified_for_next {
                totals.qualified.insert(registration.registration_id);
            }
            if !score.is_bye {
                totals.score_total += score.total_score;
                totals.scored += 1;
            }
        }
    }

    groups
        .into_iter()
        .map(|((department, year, division), totals)| {
            let average = if totals.scored > 0 {
                totals.score_total / Decimal::from(totals.scored)
            } else {
                Decimal::ZERO
            };

            DepartmentStatistics {
                department,
                year,
                division,
                participant_count: totals.participant_count,
                team_count: totals.team_count,
                average_score: decimal_to_f64(average.round_dp(2)),
                total_score: decimal_to_f64(totals.score_total),
                qualified_count: totals.qualified.len() as i64,
            }
        })
        .collect()
}

impl<S: TournamentStore> TournamentService<S> {
    pub async fn leaderboard(&self, sub_event_id: Uuid) -> TournamentResult<Vec<LeaderboardEntry>> {
        let sub_event = self.store().find_sub_event(sub_event_id).await?;
        let registrations = self.store().list_registrations(sub_event_id).await?;
        let scores = self.store().list_scores(sub_event_id, None).await?;

        Ok(build_leaderboard(&sub_event, &registrations, &scores))
    }

    pub async fn heat_standings(&self, heat_id: Uuid) -> TournamentResult<Vec<HeatStanding>> {
        let heat = self.store().find_heat(heat_id).await?;
        let registrations = self.store().list_registrations(heat.sub_event_id).await?;
        let scores = self.store().heat_scores(heat_id).await?;

        Ok(build_heat_standings(&registrations, scores))
    }

    pub async fn department_statistics(
        &self,
        event_id: Uuid,
    ) -> TournamentResult<Vec<DepartmentStatistics>> {
        self.store().find_event(event_id).await?;

        let mut registrations = Vec::new();
        let mut scores = Vec::new();
        for sub_event in self.store().list_sub_events(event_id).await? {
            registrations.extend(
                self.store()
                    .list_registrations(sub_event.sub_event_id)
                    .await?,
            );
            scores.extend(
                self.store()
                    .list_scores(sub_event.sub_event_id, None)
                    .await?,
            );
        }

        Ok(aggregate_departments(&registrations, &scores))
    }
}
