use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use storage::error::{StorageError, TournamentError};
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Tournament(TournamentError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Tournament(e) => write!(f, "Tournament error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

impl WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(e) => storage_status(e),
            Self::Tournament(e) => match e {
                TournamentError::EmptyPool { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                TournamentError::DuplicateRound { .. } => StatusCode::CONFLICT,
                TournamentError::InvalidParticipant(_) => StatusCode::BAD_REQUEST,
                TournamentError::IncompleteRound { .. } => StatusCode::CONFLICT,
                TournamentError::Configuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
                TournamentError::InvalidResult(_) => StatusCode::BAD_REQUEST,
                TournamentError::RoundClosed { .. } => StatusCode::CONFLICT,
                TournamentError::InvalidTransition { .. } => StatusCode::CONFLICT,
                TournamentError::Storage(e) => storage_status(e),
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

fn storage_status(error: &StorageError) -> StatusCode {
    match error {
        StorageError::NotFound => StatusCode::NOT_FOUND,
        StorageError::ConstraintViolation(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn storage_body(error: &StorageError) -> serde_json::Value {
    match error {
        StorageError::NotFound => {
            json!({
                "error": "Resource not found"
            })
        }
        StorageError::ConstraintViolation(msg) => {
            json!({
                "error": msg
            })
        }
        e => {
            tracing::error!("Storage error: {:?}", e);
            json!({
                "error": "An internal error occurred"
            })
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match &self {
            Self::Storage(e) | Self::Tournament(TournamentError::Storage(e)) => storage_body(e),
            Self::Tournament(e) => {
                tracing::warn!("Rejected tournament operation: {}", e);
                json!({
                    "error": e.to_string()
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::BadRequest(msg) => {
                json!({
                    "error": msg
                })
            }
            Self::Unauthorized => {
                json!({
                    "error": "Unauthorized"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<TournamentError> for WebError {
    fn from(error: TournamentError) -> Self {
        Self::Tournament(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn status(error: TournamentError) -> StatusCode {
        WebError::from(error).into_response().status()
    }

    #[test]
    fn test_tournament_errors_map_to_statuses() {
        assert_eq!(
            status(TournamentError::EmptyPool { round: 1 }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(TournamentError::DuplicateRound { round: 1 }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(TournamentError::InvalidParticipant(Uuid::new_v4())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(TournamentError::IncompleteRound {
                round: 2,
                detail: "1 of 3 heats are not completed".to_string(),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(TournamentError::Configuration("bad".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(TournamentError::InvalidResult("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(TournamentError::RoundClosed {
                round: 1,
                reason: "sub-event is finalized".to_string(),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(TournamentError::InvalidTransition {
                from: "COMPLETED".to_string(),
                to: "IN_PROGRESS".to_string(),
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_wrapped_storage_errors_keep_their_status() {
        assert_eq!(
            status(TournamentError::Storage(StorageError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WebError::from(StorageError::ConstraintViolation("dup".to_string()))
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            WebError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
