use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        heat::{
            HeatDetailResponse, RecordResultsRequest, RecordResultsResponse, ScheduleHeatRequest,
        },
        ranking::HeatStanding,
    },
    models::Heat,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::JudgeIdentity;

use super::services;

#[utoipa::path(
    get,
    path = "/api/heats/{id}",
    params(
        ("id" = Uuid, Path, description = "Heat ID")
    ),
    responses(
        (status = 200, description = "Heat found", body = HeatDetailResponse),
        (status = 404, description = "Heat not found")
    ),
    tag = "heats"
)]
pub async fn get_heat(
    State(db): State<Database>,
    Path(heat_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let heat = services::get_heat(db.pool(), heat_id).await?;

    Ok(Json(heat).into_response())
}

#[utoipa::path(
    get,
    path = "/api/heats/{id}/standings",
    params(
        ("id" = Uuid, Path, description = "Heat ID")
    ),
    responses(
        (status = 200, description = "Heat results ordered by position", body = Vec<HeatStanding>),
        (status = 404, description = "Heat not found")
    ),
    tag = "heats"
)]
pub async fn get_heat_standings(
    State(db): State<Database>,
    Path(heat_id): Path<Uuid>,
) -> Result<Json<Vec<HeatStanding>>, WebError> {
    let standings = services::heat_standings(db.pool(), heat_id).await?;

    Ok(Json(standings))
}

#[utoipa::path(
    post,
    path = "/api/heats/{id}/start",
    params(
        ("id" = Uuid, Path, description = "Heat ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Heat is in progress", body = Heat),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Heat not found"),
        (status = 409, description = "Heat is not pending or its round is closed")
    ),
    tag = "heats"
)]
pub async fn start_heat(
    State(db): State<Database>,
    Path(heat_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let heat = services::start_heat(db.pool(), heat_id).await?;

    Ok(Json(heat).into_response())
}

#[utoipa::path(
    put,
    path = "/api/heats/{id}/schedule",
    params(
        ("id" = Uuid, Path, description = "Heat ID")
    ),
    request_body = ScheduleHeatRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Heat scheduled", body = Heat),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Heat not found"),
        (status = 409, description = "Heat already completed")
    ),
    tag = "heats"
)]
pub async fn schedule_heat(
    State(db): State<Database>,
    Path(heat_id): Path<Uuid>,
    Json(req): Json<ScheduleHeatRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let heat = services::schedule_heat(db.pool(), heat_id, req.venue, req.scheduled_at).await?;

    Ok(Json(heat).into_response())
}

#[utoipa::path(
    post,
    path = "/api/heats/{id}/results",
    params(
        ("id" = Uuid, Path, description = "Heat ID")
    ),
    request_body = RecordResultsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Results ranked and stored", body = RecordResultsResponse),
        (status = 400, description = "Results do not cover exactly the heat roster, or fail validation"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Heat not found"),
        (status = 409, description = "Round is closed")
    ),
    tag = "heats"
)]
pub async fn record_results(
    State(db): State<Database>,
    Extension(judge): Extension<JudgeIdentity>,
    Path(heat_id): Path<Uuid>,
    Json(req): Json<RecordResultsRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let results = req.results.into_iter().map(Into::into).collect();
    let scores = services::record_results(db.pool(), heat_id, results, judge.0).await?;

    Ok(Json(RecordResultsResponse { heat_id, scores }).into_response())
}
