use axum::{Router, routing::get};
use storage::Database;

use super::handlers::get_department_statistics;

pub fn routes() -> Router<Database> {
    Router::new().route("/:id/department-statistics", get(get_department_statistics))
}
