//! Authentication handlers
//!
//! Registration and login on the public surface, plus the token
//! introspection endpoint other services call out-of-band.

use crate::auth::{LoginRequest, LoginResponse, RegisterRequest};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Token introspection query
#[derive(Debug, Deserialize)]
pub struct ValidateTokenQuery {
    pub token: String,
}

/// Token introspection response
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateTokenResponse {
    pub is_valid: bool,
    pub account_id: i64,
    pub email: String,
}

/// Register a new account
///
/// Responds `201 Created` with an empty body; `409` when the email is
/// already registered.
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    state.auth_service().register(&request).await?;

    Ok(StatusCode::CREATED)
}

/// Login with email and password
///
/// Returns the bearer token and its absolute expiry (unix seconds). An
/// unknown email and a wrong password produce the same failure.
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    request.validate()?;

    let response = state.auth_service().login(&request).await?;

    Ok(Json(response))
}

/// Out-of-band token introspection for sibling services
///
/// Stateless equivalent of the session gate: verifies the token and
/// re-resolves its account, reporting validity instead of gating a
/// request.
pub async fn validate_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ValidateTokenQuery>,
) -> Result<Json<ValidateTokenResponse>, AppError> {
    let introspection = state.auth_service().validate_token(&query.token).await?;

    Ok(Json(ValidateTokenResponse {
        is_valid: true,
        account_id: introspection.account_id,
        email: introspection.email,
    }))
}
