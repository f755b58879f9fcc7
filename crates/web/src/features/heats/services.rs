use chrono::NaiveDateTime;
use sqlx::PgPool;
use storage::{
    PgStore, TournamentService,
    dto::{heat::HeatDetailResponse, ranking::HeatStanding},
    error::TournamentResult,
    models::{Heat, Score},
    services::qualification::RawResult,
};
use uuid::Uuid;

fn engine(pool: &PgPool) -> TournamentService<PgStore<'_>> {
    TournamentService::new(PgStore::new(pool))
}

/// Get a heat with its roster
pub async fn get_heat(pool: &PgPool, heat_id: Uuid) -> TournamentResult<HeatDetailResponse> {
    engine(pool).heat_detail(heat_id).await
}

pub async fn heat_standings(pool: &PgPool, heat_id: Uuid) -> TournamentResult<Vec<HeatStanding>> {
    engine(pool).heat_standings(heat_id).await
}

pub async fn start_heat(pool: &PgPool, heat_id: Uuid) -> TournamentResult<Heat> {
    engine(pool).start_heat(heat_id).await
}

pub async fn schedule_heat(
    pool: &PgPool,
    heat_id: Uuid,
    venue: Option<String>,
    scheduled_at: Option<NaiveDateTime>,
) -> TournamentResult<Heat> {
    engine(pool)
        .schedule_heat(heat_id, venue, scheduled_at)
        .await
}

/// Rank and store the results of a heat on behalf of a judge
pub async fn record_results(
    pool: &PgPool,
    heat_id: Uuid,
    results: Vec<RawResult>,
    judged_by: String,
) -> TournamentResult<Vec<Score>> {
    engine(pool)
        .record_heat_results(heat_id, results, Some(judged_by))
        .await
}
