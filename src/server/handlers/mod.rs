pub mod events;
pub mod files;
pub mod generation;
pub mod health;
pub mod model;
pub mod projects;
pub mod users;

use axum::http::StatusCode;

use crate::errors::GenerationError;

/// Single place mapping pipeline errors onto HTTP status codes.
pub fn error_status(err: &GenerationError) -> StatusCode {
    match err {
        GenerationError::ProjectNotFound(_) | GenerationError::NotFound(_) => {
            StatusCode::NOT_FOUND
        }
        GenerationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GenerationError::PathEscape => StatusCode::FORBIDDEN,
        GenerationError::QueueClosed => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
