use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::{PaginatedResponse, PaginationParams},
        heat::{GenerateHeatsResponse, HeatDetailResponse},
        ranking::LeaderboardEntry,
        round::RoundSummary,
        scoring::{ScorePreviewRequest, ScorePreviewResponse},
    },
    models::SubEvent,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::JudgeIdentity;

use super::services;

#[utoipa::path(
    post,
    path = "/api/sub-events/{id}/rounds/{round}/heats",
    params(
        ("id" = Uuid, Path, description = "Sub-event ID"),
        ("round" = i32, Path, description = "Round number, must be the current round")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Heats generated", body = GenerateHeatsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Sub-event not found"),
        (status = 409, description = "Heats already exist or the sub-event is finalized"),
        (status = 422, description = "No eligible participants or invalid configuration")
    ),
    tag = "rounds"
)]
pub async fn generate_heats(
    State(db): State<Database>,
    Extension(operator): Extension<JudgeIdentity>,
    Path((sub_event_id, round_number)): Path<(Uuid, i32)>,
) -> Result<Response, WebError> {
    let heats = services::generate_heats(db.pool(), sub_event_id, round_number).await?;

    tracing::info!(
        operator = %operator.0,
        %sub_event_id,
        round = round_number,
        "Heats generated on request"
    );

    Ok((
        StatusCode::CREATED,
        Json(GenerateHeatsResponse {
            sub_event_id,
            round_number,
            heats,
        }),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/sub-events/{id}/rounds/{round}/heats",
    params(
        ("id" = Uuid, Path, description = "Sub-event ID"),
        ("round" = i32, Path, description = "Round number")
    ),
    responses(
        (status = 200, description = "Heats of the round with their rosters", body = Vec<HeatDetailResponse>),
        (status = 404, description = "Sub-event not found")
    ),
    tag = "rounds"
)]
pub async fn list_round_heats(
    State(db): State<Database>,
    Path((sub_event_id, round_number)): Path<(Uuid, i32)>,
) -> Result<Response, WebError> {
    let heats = services::list_heats(db.pool(), sub_event_id, round_number).await?;

    Ok(Json(heats).into_response())
}

#[utoipa::path(
    get,
    path = "/api/sub-events/{id}/rounds/{round}/summary",
    params(
        ("id" = Uuid, Path, description = "Sub-event ID"),
        ("round" = i32, Path, description = "Round number")
    ),
    responses(
        (status = 200, description = "Round state and counts", body = RoundSummary),
        (status = 404, description = "Sub-event not found"),
        (status = 422, description = "Round outside the sub-event's range")
    ),
    tag = "rounds"
)]
pub async fn get_round_summary(
    State(db): State<Database>,
    Path((sub_event_id, round_number)): Path<(Uuid, i32)>,
) -> Result<Json<RoundSummary>, WebError> {
    let summary = services::round_summary(db.pool(), sub_event_id, round_number).await?;

    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/api/sub-events/{id}/advance",
    params(
        ("id" = Uuid, Path, description = "Sub-event ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Round advanced, or sub-event finalized after its last round", body = SubEvent),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Sub-event not found"),
        (status = 409, description = "Heats still open or sub-event already finalized")
    ),
    tag = "rounds"
)]
pub async fn advance_round(
    State(db): State<Database>,
    Extension(operator): Extension<JudgeIdentity>,
    Path(sub_event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let sub_event = services::advance_round(db.pool(), sub_event_id).await?;

    tracing::info!(
        operator = %operator.0,
        %sub_event_id,
        current_round = sub_event.current_round,
        "Round advanced on request"
    );

    Ok(Json(sub_event).into_response())
}

#[utoipa::path(
    post,
    path = "/api/sub-events/{id}/score-preview",
    params(
        ("id" = Uuid, Path, description = "Sub-event ID")
    ),
    request_body = ScorePreviewRequest,
    responses(
        (status = 200, description = "Weighted total for the given criterion scores", body = ScorePreviewResponse),
        (status = 400, description = "Unknown or out-of-range criterion"),
        (status = 404, description = "Sub-event not found"),
        (status = 422, description = "Sub-event is ranked by time")
    ),
    tag = "rounds"
)]
pub async fn preview_score(
    State(db): State<Database>,
    Path(sub_event_id): Path<Uuid>,
    Json(req): Json<ScorePreviewRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let preview = services::preview_score(db.pool(), sub_event_id, req.criteria_scores).await?;

    Ok(Json(preview).into_response())
}

#[utoipa::path(
    get,
    path = "/api/sub-events/{id}/leaderboard",
    params(
        ("id" = Uuid, Path, description = "Sub-event ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Leaderboard retrieved successfully", body = PaginatedResponse<LeaderboardEntry>),
        (status = 400, description = "Invalid query parameters"),
        (status = 404, description = "Sub-event not found")
    ),
    tag = "rankings"
)]
pub async fn get_leaderboard(
    State(db): State<Database>,
    Path(sub_event_id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Response, WebError> {
    pagination.validate().map_err(WebError::BadRequest)?;

    let entries = services::leaderboard(db.pool(), sub_event_id).await?;
    let (page, total_items) = pagination.slice(entries);

    let response = PaginatedResponse::new(
        page,
        pagination.page,
        pagination.page_size,
        total_items,
    );

    Ok(Json(response).into_response())
}
