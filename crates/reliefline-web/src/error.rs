//! Web-layer errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reliefline_core::CaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum WebError {
    #[error("authentication required")]
    MissingCredentials,

    #[error("invalid or expired credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Case(#[from] CaseError),

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WebError>;

impl WebError {
    fn status(&self) -> StatusCode {
        match self {
            WebError::MissingCredentials | WebError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            WebError::Forbidden(_) => StatusCode::FORBIDDEN,
            WebError::Case(CaseError::NotFound(_)) => StatusCode::NOT_FOUND,
            WebError::Case(CaseError::Unauthorized { .. }) => StatusCode::FORBIDDEN,
            WebError::Case(CaseError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            WebError::Case(CaseError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Config(_) | WebError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            WebError::MissingCredentials | WebError::InvalidCredentials => "unauthorized",
            WebError::Forbidden(_) | WebError::Case(CaseError::Unauthorized { .. }) => "forbidden",
            WebError::Case(CaseError::NotFound(_)) => "not_found",
            WebError::Case(CaseError::InvalidTransition { .. }) => "invalid_transition",
            WebError::BadRequest(_) => "bad_request",
            WebError::Case(CaseError::Store(_)) | WebError::Config(_) | WebError::Io(_) => {
                "internal"
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reliefline_core::{CaseId, CaseStatus, UserId};

    #[test]
    fn status_mapping() {
        assert_eq!(WebError::MissingCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            WebError::Case(CaseError::NotFound(CaseId::new())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WebError::Case(CaseError::unauthorized(UserId::new(), "resolve this case")).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            WebError::Case(CaseError::invalid_transition(
                CaseStatus::Pending,
                CaseStatus::InProgress
            ))
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            WebError::Case(CaseError::store("disk on fire")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
