use sqlx::PgPool;
use storage::{
    PgStore, TournamentService, dto::ranking::DepartmentStatistics, error::TournamentResult,
};
use uuid::Uuid;

/// Participation and score totals per department, year and division
pub async fn department_statistics(
    pool: &PgPool,
    event_id: Uuid,
) -> TournamentResult<Vec<DepartmentStatistics>> {
    TournamentService::new(PgStore::new(pool))
        .department_statistics(event_id)
        .await
}
