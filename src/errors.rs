use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or out-of-range input. The message is field-specific and
    /// goes to the client verbatim.
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation surfaced from the store, carrying the
    /// database's diagnostic verbatim. The detail is opaque to callers.
    #[error("{0}")]
    Conflict(String),

    /// The requested titulo id has no record. Lookups report absence as a
    /// result, not an error; this variant only exists so the HTTP shell
    /// can map it to a 404 response.
    #[error("\"titulo_id\" has no register.")]
    NotFound,

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "\"titulo_id\" has no register.".to_string(),
            ),
            AppError::Db(e) => {
                error!("unexpected database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Internal(msg) => {
                error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "err": message }))).into_response()
    }
}
