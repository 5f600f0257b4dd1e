//! Account handlers

use crate::account::{AccountResponse, UpdateAccountRequest};
use crate::auth::AuthenticatedAccount;
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use std::sync::Arc;
use validator::Validate;

/// Current account, as resolved by the session gate
pub async fn get_account_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedAccount>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state.account_service().get_account(auth.id).await?;

    Ok(Json(AccountResponse::from(account)))
}

/// Update the account email
pub async fn update_account_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedAccount>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    state
        .account_service()
        .update_email(auth.id, &request.email)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
