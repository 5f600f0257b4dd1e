//! Authentication service layer
//!
//! Business logic for account registration, login, and out-of-band token
//! validation. Storage, token, and hashing capabilities are injected so
//! tests can substitute doubles.

use crate::auth::jwt::{TokenCodec, TokenError};
use crate::auth::password::{PasswordError, PasswordHasher};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use user_core::{IdentityStore, NewAccount, StoreError};
use validator::Validate;

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Login response: the bearer token and its absolute expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Unix seconds
    pub expires_at: i64,
}

/// Result of out-of-band token validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenIntrospection {
    pub account_id: i64,
    pub email: String,
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("account already exists")]
    AlreadyExists,

    /// Unknown email and wrong password both surface as this one kind, so
    /// the caller cannot tell which of the two occurred.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("unauthorized")]
    Unauthorized,

    #[error("credential hashing failed: {0}")]
    Hashing(String),

    #[error("token issuance failed: {0}")]
    Issuance(#[from] TokenError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn IdentityStore>,
    codec: TokenCodec,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(store: Arc<dyn IdentityStore>, codec: TokenCodec, hasher: PasswordHasher) -> Self {
        Self {
            store,
            codec,
            hasher,
        }
    }

    /// Register a new account, returning the persisted account id.
    ///
    /// The existence check gives the common case a clean error; the
    /// store's email-keyed upsert remains the arbiter for two concurrent
    /// registrations, which it resolves to a single row.
    pub async fn register(&self, request: &RegisterRequest) -> Result<i64, AuthError> {
        if self
            .store
            .find_account_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = self
            .hasher
            .hash(&request.password)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        let account_id = self
            .store
            .upsert_account(&NewAccount {
                email: request.email.clone(),
                password_hash,
            })
            .await?;

        tracing::info!(account_id, "account registered");
        Ok(account_id)
    }

    /// Login with email and password, issuing a bearer token.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let account = self
            .store
            .find_account_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        match self.hasher.verify(&request.password, &account.password_hash) {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(AuthError::Hashing(e.to_string())),
        }

        let issued = self.codec.issue(account.id, &account.email)?;

        tracing::debug!(account_id = account.id, "login succeeded");
        Ok(LoginResponse {
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }

    /// Validate a token out-of-band and re-resolve its account.
    ///
    /// A token that verifies cryptographically but points at an account no
    /// longer in the store is rejected: deleting an account ends its
    /// outstanding sessions.
    pub async fn validate_token(&self, token: &str) -> Result<TokenIntrospection, AuthError> {
        let claims = match self.codec.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(reason = %e, "token rejected");
                return Err(AuthError::Unauthorized);
            }
        };

        let account = self
            .store
            .find_account_by_id(claims.sub)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        Ok(TokenIntrospection {
            account_id: account.id,
            email: account.email,
        })
    }
}
