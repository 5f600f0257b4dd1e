//! Application state management

use crate::account::AccountService;
use crate::auth::{AuthService, PasswordHasher, TokenCodec, TokenConfig};
use std::sync::Arc;
use user_core::{AppConfig, IdentityStore};

/// Application state shared across handlers
///
/// The token codec is built here from configuration, so the signing secret
/// is injected once at startup rather than read from ambient state.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Identity store
    pub store: Arc<dyn IdentityStore>,
    /// Token codec with the process-wide signing secret
    pub codec: TokenCodec,
    /// Credential hasher
    pub hasher: PasswordHasher,
}

impl AppState {
    /// Create new application state with config and a connected store
    pub fn new(config: AppConfig, store: Arc<dyn IdentityStore>) -> Self {
        let codec = TokenCodec::new(TokenConfig {
            secret: config.auth.token_secret.clone(),
            ttl_secs: config.auth.token_ttl_secs,
        });

        Self {
            config,
            store,
            codec,
            hasher: PasswordHasher::default(),
        }
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.store.clone(), self.codec.clone(), self.hasher.clone())
    }

    pub fn account_service(&self) -> AccountService {
        AccountService::new(self.store.clone())
    }
}
