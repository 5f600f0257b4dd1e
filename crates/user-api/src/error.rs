//! API error handling

use crate::account::AccountError;
use crate::auth::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new("NOT_FOUND", format!("{resource} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn unauthorized() -> Self {
        Self::new("UNAUTHORIZED", "Unauthorized")
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    AlreadyExists,
    InvalidCredentials,
    Unauthorized,
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::AlreadyExists => (
                StatusCode::CONFLICT,
                ApiError::new("ALREADY_EXISTS", "account already exists"),
            ),
            AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_CREDENTIALS", "invalid email or password"),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, ApiError::unauthorized()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::not_found(&msg)),
            AppError::Internal(msg) => {
                // the detail goes to the log, never into the response
                tracing::error!(error = %msg, "internal fault");
                (StatusCode::INTERNAL_SERVER_ERROR, ApiError::internal_error())
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AlreadyExists => AppError::AlreadyExists,
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Unauthorized => AppError::Unauthorized,
            AuthError::Hashing(msg) => AppError::Internal(msg),
            AuthError::Issuance(e) => AppError::Internal(e.to_string()),
            AuthError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::AccountNotFound => AppError::NotFound("account".to_string()),
            AccountError::ProfileNotFound => AppError::NotFound("profile".to_string()),
            AccountError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_credentials_carries_no_detail() {
        let (status, body) = body_of(AppError::InvalidCredentials).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
        assert_eq!(body["message"], "invalid email or password");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_fault_hides_its_cause() {
        let (status, body) =
            body_of(AppError::Internal("connection refused at 10.0.0.3".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(!body.to_string().contains("10.0.0.3"));
    }

    #[tokio::test]
    async fn test_already_exists_maps_to_conflict() {
        let (status, body) = body_of(AppError::AlreadyExists).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ALREADY_EXISTS");
    }
}
