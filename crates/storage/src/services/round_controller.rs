use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use super::heat_generation::{build_heats, plan_heats};
use super::participant_pool::resolve_pool;
use super::qualification::{RawResult, ensure_full_roster, rank_results};
use super::scoring::{compute_weighted_score, max_weighted_score, validate_criteria_scores};
use crate::dto::heat::HeatDetailResponse;
use crate::dto::round::{RoundState, RoundSummary};
use crate::dto::scoring::ScorePreviewResponse;
use crate::error::{TournamentError, TournamentResult};
use crate::models::{Heat, HeatParticipant, HeatStatus, NewScore, Score, SubEvent};
use crate::store::{RoundAdvance, TournamentStore};

/// Drives a sub-event through its rounds: heat generation, result
/// recording, and advancement.
pub struct TournamentService<S> {
    store: S,
}

impl<S: TournamentStore> TournamentService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Partitions the eligible pool of `round_number` into shuffled heats.
    ///
    /// Lone entrants of multi-seat heats are written as completed byes.
    pub async fn generate_heats(
        &self,
        sub_event_id: Uuid,
        round_number: i32,
    ) -> TournamentResult<Vec<HeatDetailResponse>> {
        let sub_event = self.store.find_sub_event(sub_event_id).await?;
        sub_event.validate()?;

        if sub_event.is_finalized {
            return Err(TournamentError::RoundClosed {
                round: round_number,
                reason: "sub-event is finalized".to_string(),
            });
        }

        if round_number != sub_event.current_round {
            return Err(TournamentError::Configuration(format!(
                "round {} cannot be generated while round {} is current",
                round_number, sub_event.current_round
            )));
        }

        if !self
            .store
            .list_heats(sub_event_id, round_number)
            .await?
            .is_empty()
        {
            return Err(TournamentError::DuplicateRound {
                round: round_number,
            });
        }

        let registrations = self.store.list_registrations(sub_event_id).await?;
        let mismatched = registrations
            .iter()
            .filter(|registration| {
                registration.is_eligible()
                    && registration.participation.mode() != sub_event.participation_mode
            })
            .count();
        if mismatched > 0 {
            warn!(
                %sub_event_id,
                mode = %sub_event.participation_mode,
                mismatched,
                "Skipping registrations that do not match the participation mode"
            );
        }

        let previous_scores = if round_number > 1 {
            self.store
                .list_scores(sub_event_id, Some(round_number - 1))
                .await?
        } else {
            Vec::new()
        };

        let pool: Vec<Uuid> = resolve_pool(
            sub_event.participation_mode,
            round_number,
            registrations,
            &previous_scores,
        )
            .into_iter()
            .map(|registration| registration.registration_id)
            .collect();

        if pool.is_empty() {
            return Err(TournamentError::EmptyPool {
                round: round_number,
            });
        }

        let pool_size = pool.len();
        let plans = plan_heats(pool, sub_event.capacity(), &mut rand::rng());
        let (new_heats, byes) = build_heats(&sub_event, round_number, plans);

        let heats = self
            .store
            .create_heats(&new_heats, &byes)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    TournamentError::DuplicateRound {
                        round: round_number,
                    }
                } else {
                    TournamentError::from(e)
                }
            })?;

        info!(
            %sub_event_id,
            round = round_number,
            heats = heats.len(),
            entrants = pool_size,
            byes = byes.len(),
            "Generated heats"
        );

        Ok(heats
            .into_iter()
            .zip(new_heats)
            .map(|(heat, planned)| {
                let roster = planned
                    .registration_ids
                    .iter()
                    .enumerate()
                    .map(|(idx, registration_id)| HeatParticipant {
                        heat_id: heat.heat_id,
                        registration_id: *registration_id,
                        lane: idx as i32 + 1,
                    })
                    .collect();
                HeatDetailResponse::new(heat, roster)
            })
            .collect())
    }

    /// Ranks one heat's results and writes positions and qualification.
    ///
    /// Nothing is written unless the results cover exactly the heat roster
    /// and pass validation. Recording a completed heat again re-scores every
    /// entrant.
    pub async fn record_heat_results(
        &self,
        heat_id: Uuid,
        results: Vec<RawResult>,
        judged_by: Option<String>,
    ) -> TournamentResult<Vec<Score>> {
        let heat = self.store.find_heat(heat_id).await?;
        let sub_event = self.store.find_sub_event(heat.sub_event_id).await?;
        ensure_round_open(&sub_event, heat.round_number)?;

        let roster = self.store.heat_roster(heat_id).await?;
        ensure_full_roster(&roster, &results)?;

        if self
            .store
            .heat_scores(heat_id)
            .await?
            .iter()
            .any(|score| score.is_bye)
        {
            return Err(TournamentError::InvalidResult(format!(
                "heat {} is a bye and takes no results",
                heat.heat_number
            )));
        }

        let ranked = rank_results(&sub_event, results)?;

        let scores: Vec<NewScore> = ranked
            .into_iter()
            .map(|result| NewScore {
                sub_event_id: sub_event.sub_event_id,
                registration_id: result.registration_id,
                heat_id: Some(heat_id),
                round_number: heat.round_number,
                criteria_scores: result.criteria_scores,
                total_score: result.total_score,
                position: Some(result.position),
                time_taken: result.time_taken,
                qualified_for_next: result.qualified,
                is_bye: false,
                judged_by: judged_by.clone(),
            })
            .collect();

        let rescored = heat.is_completed();
        let stored = self
            .store
            .record_heat_results(heat_id, &scores, chrono::Utc::now().naive_utc())
            .await?;

        info!(
            %heat_id,
            round = heat.round_number,
            results = stored.len(),
            qualified = stored.iter().filter(|s| s.qualified_for_next).count(),
            rescored,
            "Recorded heat results"
        );

        Ok(stored)
    }

    /// Closes the current round once every heat is completed.
    ///
    /// Qualified registrations move to the next round; closing the last
    /// round finalizes the sub-event instead.
    pub async fn advance_round(&self, sub_event_id: Uuid) -> TournamentResult<SubEvent> {
        let sub_event = self.store.find_sub_event(sub_event_id).await?;
        let round = sub_event.current_round;

        if sub_event.is_finalized {
            return Err(TournamentError::RoundClosed {
                round,
                reason: "sub-event is finalized".to_string(),
            });
        }

        let heats = self.store.list_heats(sub_event_id, round).await?;
        if heats.is_empty() {
            return Err(TournamentError::IncompleteRound {
                round,
                detail: "no heats have been generated".to_string(),
            });
        }

        let open = heats.iter().filter(|heat| !heat.is_completed()).count();
        if open > 0 {
            warn!(%sub_event_id, round, open, "Advance refused with open heats");
            return Err(TournamentError::IncompleteRound {
                round,
                detail: format!("{} of {} heats are not completed", open, heats.len()),
            });
        }

        let mut seen = HashSet::new();
        let promoted: Vec<Uuid> = self
            .store
            .list_scores(sub_event_id, Some(round))
            .await?
            .into_iter()
            .filter(|score| score.qualified_for_next)
            .map(|score| score.registration_id)
            .filter(|id| seen.insert(*id))
            .collect();

        let advance = if sub_event.is_last_round() {
            RoundAdvance {
                from_round: round,
                current_round: round,
                is_finalized: true,
                promoted: Vec::new(),
            }
        } else {
            RoundAdvance {
                from_round: round,
                current_round: round + 1,
                is_finalized: false,
                promoted,
            }
        };

        let updated = self.store.advance_round(sub_event_id, &advance).await?;

        info!(
            %sub_event_id,
            from_round = advance.from_round,
            current_round = updated.current_round,
            promoted = advance.promoted.len(),
            finalized = updated.is_finalized,
            "Advanced round"
        );

        Ok(updated)
    }

    pub async fn round_summary(
        &self,
        sub_event_id: Uuid,
        round_number: i32,
    ) -> TournamentResult<RoundSummary> {
        let sub_event = self.store.find_sub_event(sub_event_id).await?;

        if round_number < 1 || round_number > sub_event.total_rounds {
            return Err(TournamentError::Configuration(format!(
                "round {} is outside 1..={}",
                round_number, sub_event.total_rounds
            )));
        }

        let heats = self.store.list_heats(sub_event_id, round_number).await?;
        let scores = self
            .store
            .list_scores(sub_event_id, Some(round_number))
            .await?;

        let qualified: HashSet<Uuid> = scores
            .iter()
            .filter(|score| score.qualified_for_next)
            .map(|score| score.registration_id)
            .collect();

        Ok(RoundSummary {
            sub_event_id,
            round_number,
            state: round_state(&sub_event, round_number, &heats),
            total_heats: heats.len(),
            completed_heats: heats.iter().filter(|heat| heat.is_completed()).count(),
            qualified_participants: qualified.len(),
            byes: scores.iter().filter(|score| score.is_bye).count(),
        })
    }

    pub async fn start_heat(&self, heat_id: Uuid) -> TournamentResult<Heat> {
        let heat = self.store.find_heat(heat_id).await?;
        let sub_event = self.store.find_sub_event(heat.sub_event_id).await?;
        ensure_round_open(&sub_event, heat.round_number)?;

        if heat.status != HeatStatus::Pending {
            return Err(TournamentError::InvalidTransition {
                from: heat.status.to_string(),
                to: HeatStatus::InProgress.to_string(),
            });
        }

        let started = self
            .store
            .update_heat_status(heat_id, HeatStatus::InProgress)
            .await?;

        info!(%heat_id, heat = started.heat_number, "Started heat");
        Ok(started)
    }

    pub async fn schedule_heat(
        &self,
        heat_id: Uuid,
        venue: Option<String>,
        scheduled_at: Option<chrono::NaiveDateTime>,
    ) -> TournamentResult<Heat> {
        let heat = self.store.find_heat(heat_id).await?;

        if heat.is_completed() {
            return Err(TournamentError::InvalidTransition {
                from: heat.status.to_string(),
                to: "SCHEDULED".to_string(),
            });
        }

        Ok(self
            .store
            .schedule_heat(heat_id, venue, scheduled_at)
            .await?)
    }

    pub async fn heat_detail(&self, heat_id: Uuid) -> TournamentResult<HeatDetailResponse> {
        let heat = self.store.find_heat(heat_id).await?;
        let roster = self.store.heat_roster(heat_id).await?;
        Ok(HeatDetailResponse::new(heat, roster))
    }

    pub async fn list_heats(
        &self,
        sub_event_id: Uuid,
        round_number: i32,
    ) -> TournamentResult<Vec<HeatDetailResponse>> {
        self.store.find_sub_event(sub_event_id).await?;

        let heats = self.store.list_heats(sub_event_id, round_number).await?;
        let mut details = Vec::with_capacity(heats.len());
        for heat in heats {
            let roster = self.store.heat_roster(heat.heat_id).await?;
            details.push(HeatDetailResponse::new(heat, roster));
        }

        Ok(details)
    }

    /// Weighted total of raw criterion scores, without writing anything.
    pub async fn preview_score(
        &self,
        sub_event_id: Uuid,
        criteria_scores: BTreeMap<String, Decimal>,
    ) -> TournamentResult<ScorePreviewResponse> {
        let sub_event = self.store.find_sub_event(sub_event_id).await?;

        if sub_event.round_format.is_timed() {
            return Err(TournamentError::Configuration(format!(
                "{} rounds are ranked by time, not criteria",
                sub_event.round_format
            )));
        }

        validate_criteria_scores(&criteria_scores, &sub_event.criteria)?;

        Ok(ScorePreviewResponse {
            sub_event_id,
            total_score: compute_weighted_score(&criteria_scores, &sub_event.criteria),
            max_possible: max_weighted_score(&sub_event.criteria),
        })
    }
}

fn ensure_round_open(sub_event: &SubEvent, round_number: i32) -> TournamentResult<()> {
    if sub_event.is_finalized {
        return Err(TournamentError::RoundClosed {
            round: round_number,
            reason: "sub-event is finalized".to_string(),
        });
    }

    if round_number != sub_event.current_round {
        return Err(TournamentError::RoundClosed {
            round: round_number,
            reason: format!("round {} is current", sub_event.current_round),
        });
    }

    Ok(())
}

/// Lifecycle state of `round_number` given its heats.
pub fn round_state(sub_event: &SubEvent, round_number: i32, heats: &[Heat]) -> RoundState {
    if round_number < sub_event.current_round {
        return RoundState::Advanced;
    }
    if round_number > sub_event.current_round {
        return RoundState::Pending;
    }
    if sub_event.is_finalized {
        return RoundState::Finalized;
    }

    if heats.is_empty() {
        RoundState::Pending
    } else if heats.iter().all(|heat| heat.is_completed()) {
        RoundState::ResultsRecorded
    } else {
        RoundState::HeatsGenerated
    }
}
