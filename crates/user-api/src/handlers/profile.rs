//! Profile handlers
//!
//! Profile ownership comes from the session gate: callers can only touch
//! the profile of the account their token resolves to. The private lookup
//! is the out-of-band exception for sibling services.

use crate::account::{ProfileRequest, ProfileResponse};
use crate::auth::AuthenticatedAccount;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Private profile lookup query
#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub account_id: i64,
}

/// Create the authenticated account's profile
pub async fn create_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedAccount>,
    Json(request): Json<ProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    state
        .account_service()
        .create_profile(auth.id, request)
        .await?;

    Ok(StatusCode::CREATED)
}

/// Profile of the authenticated account
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedAccount>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.account_service().get_profile(auth.id).await?;

    Ok(Json(ProfileResponse::from(profile)))
}

/// Update the authenticated account's profile
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedAccount>,
    Json(request): Json<ProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    state
        .account_service()
        .update_profile(auth.id, request)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Out-of-band profile lookup for sibling services
pub async fn private_profile_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state
        .account_service()
        .get_profile(query.account_id)
        .await?;

    Ok(Json(ProfileResponse::from(profile)))
}
