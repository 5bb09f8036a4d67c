//! API error mapping

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use leadflow_core::{RepositoryError, UseCaseError};
use thiserror::Error;

use crate::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<UseCaseError> for ApiError {
    fn from(err: UseCaseError) -> Self {
        match err {
            UseCaseError::NotFound(msg) => ApiError::NotFound(msg),
            UseCaseError::ValidationError(msg) => ApiError::BadRequest(msg),
            UseCaseError::PersistenceFailure(err @ RepositoryError::DuplicateKey(_)) => {
                ApiError::Conflict(err.to_string())
            }
            UseCaseError::PersistenceFailure(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            message: self.to_string(),
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_case_error_status_mapping() {
        let cases = [
            (UseCaseError::NotFound("Lead not found".into()), StatusCode::NOT_FOUND),
            (UseCaseError::ValidationError("bad".into()), StatusCode::BAD_REQUEST),
            (
                UseCaseError::PersistenceFailure(RepositoryError::DuplicateKey("lead-1".into())),
                StatusCode::CONFLICT,
            ),
            (
                UseCaseError::PersistenceFailure(RepositoryError::Storage("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_not_found_keeps_message() {
        let err = ApiError::from(UseCaseError::NotFound("Sales caller not found".into()));
        assert_eq!(err.to_string(), "Sales caller not found");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
