/// Session gate for protected routes
///
/// Verifies the bearer token on every protected request, re-resolves the
/// embedded account against the store, and injects the verified identity
/// into the request extensions for downstream handlers.
use crate::auth::jwt::TokenError;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use user_core::StoreError;

/// Verified identity attached to the request by the session gate.
///
/// Handlers extract it with `Extension<AuthenticatedAccount>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedAccount {
    pub id: i64,
    pub email: String,
}

/// Session gate rejection reasons.
///
/// The distinctions exist for the logs only: every variant maps to the
/// same 401 response so callers cannot probe why they were rejected.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("missing authorization header")]
    MissingHeader,

    #[error("malformed authorization header")]
    MalformedHeader,

    #[error("token rejected: {0}")]
    Token(#[from] TokenError),

    #[error("account no longer exists")]
    AccountGone,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        match &self {
            GateError::Store(e) => tracing::error!(error = %e, "session gate storage fault"),
            e => tracing::debug!(reason = %e, "request rejected"),
        }

        (StatusCode::UNAUTHORIZED, axum::Json(ApiError::unauthorized())).into_response()
    }
}

/// Middleware requiring a valid bearer token that resolves to a live
/// account.
///
/// 1. Reads the `Authorization` header; absent or empty rejects.
/// 2. Strips the `Bearer ` scheme and verifies the token.
/// 3. Re-resolves the embedded account id against the store.
/// 4. Inserts `AuthenticatedAccount` into extensions and continues.
pub async fn session_gate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(GateError::MissingHeader)?
        .to_str()
        .map_err(|_| GateError::MalformedHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or(GateError::MalformedHeader)?;

    let claims = state.codec.verify(token)?;

    let account = state
        .store
        .find_account_by_id(claims.sub)
        .await?
        .ok_or(GateError::AccountGone)?;

    request.extensions_mut().insert(AuthenticatedAccount {
        id: account.id,
        email: account.email,
    });

    Ok(next.run(request).await)
}
