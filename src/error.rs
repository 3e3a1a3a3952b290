use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::news::client::NewsError;

/// API failure taxonomy. Every variant renders as a JSON body with at least
/// an `error` field; validation failures additionally carry `errors`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String, errors: Vec<String> },
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Upstream(#[from] NewsError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(errors: Vec<String>) -> Self {
        ApiError::Validation {
            message: "Validation failed".to_string(),
            errors,
        }
    }

    pub fn unauthenticated() -> Self {
        ApiError::Unauthorized("Unauthorized - Please login".to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let errors = match &self {
            ApiError::Validation { errors, .. } => Some(errors.clone()),
            _ => None,
        };
        let message = self.to_string();
        let body = ErrorBody {
            error: message.clone(),
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400_with_error_list() {
        let err = ApiError::validation(vec!["title is required".into()]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn auth_failures_map_to_401() {
        let response = ApiError::unauthenticated().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn ownership_failures_map_to_403() {
        let err = ApiError::Forbidden("You do not have permission to edit this article".into());
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_rows_map_to_404() {
        let err = ApiError::NotFound("Article not found".into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_failures_map_to_500() {
        let err = ApiError::Upstream(NewsError::Empty);
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_body_skips_absent_error_list() {
        let body = ErrorBody {
            error: "Article not found".into(),
            message: "Article not found".into(),
            errors: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("errors"));
        assert!(json.contains("Article not found"));
    }
}
