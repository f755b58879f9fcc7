use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use storage::{
    PgStore, TournamentService,
    dto::{
        heat::HeatDetailResponse, ranking::LeaderboardEntry, round::RoundSummary,
        scoring::ScorePreviewResponse,
    },
    error::TournamentResult,
    models::SubEvent,
};
use uuid::Uuid;

fn engine(pool: &PgPool) -> TournamentService<PgStore<'_>> {
    TournamentService::new(PgStore::new(pool))
}

/// Generate the heats of a round
pub async fn generate_heats(
    pool: &PgPool,
    sub_event_id: Uuid,
    round_number: i32,
) -> TournamentResult<Vec<HeatDetailResponse>> {
    engine(pool).generate_heats(sub_event_id, round_number).await
}

/// List the heats of a round with their rosters
pub async fn list_heats(
    pool: &PgPool,
    sub_event_id: Uuid,
    round_number: i32,
) -> TournamentResult<Vec<HeatDetailResponse>> {
    engine(pool).list_heats(sub_event_id, round_number).await
}

pub async fn round_summary(
    pool: &PgPool,
    sub_event_id: Uuid,
    round_number: i32,
) -> TournamentResult<RoundSummary> {
    engine(pool).round_summary(sub_event_id, round_number).await
}

/// Close the current round and promote its qualifiers
pub async fn advance_round(pool: &PgPool, sub_event_id: Uuid) -> TournamentResult<SubEvent> {
    engine(pool).advance_round(sub_event_id).await
}

pub async fn preview_score(
    pool: &PgPool,
    sub_event_id: Uuid,
    criteria_scores: BTreeMap<String, Decimal>,
) -> TournamentResult<ScorePreviewResponse> {
    engine(pool)
        .preview_score(sub_event_id, criteria_scores)
        .await
}

/// Full leaderboard of a sub-event, best result per registration
pub async fn leaderboard(
    pool: &PgPool,
    sub_event_id: Uuid,
) -> TournamentResult<Vec<LeaderboardEntry>> {
    engine(pool).leaderboard(sub_event_id).await
}
