use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use storage::Database;

use super::handlers::{get_heat, get_heat_standings, record_results, schedule_heat, start_heat};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/:id/start", post(start_heat))
        .route("/:id/schedule", put(schedule_heat))
        .route("/:id/results", post(record_results))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/:id", get(get_heat))
        .route("/:id/standings", get(get_heat_standings))
        .merge(protected)
}
