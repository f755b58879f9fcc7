use axum::{
    Json,
    extract::{Path, State},
};
use storage::{Database, dto::ranking::DepartmentStatistics};
use uuid::Uuid;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/events/{id}/department-statistics",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Statistics grouped by department, year and division", body = Vec<DepartmentStatistics>),
        (status = 404, description = "Event not found")
    ),
    tag = "rankings"
)]
pub async fn get_department_statistics(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<DepartmentStatistics>>, WebError> {
    let statistics = services::department_statistics(db.pool(), event_id).await?;

    Ok(Json(statistics))
}
