use axum::{
    Router, middleware,
    routing::{get, post},
};
use storage::Database;

use super::handlers::{
    advance_round, generate_heats, get_leaderboard, get_round_summary, list_round_heats,
    preview_score,
};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/:id/rounds/:round/heats", post(generate_heats))
        .route("/:id/advance", post(advance_round))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/:id/rounds/:round/heats", get(list_round_heats))
        .route("/:id/rounds/:round/summary", get(get_round_summary))
        .route("/:id/score-preview", post(preview_score))
        .route("/:id/leaderboard", get(get_leaderboard))
        .merge(protected)
}
