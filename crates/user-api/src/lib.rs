//! User identity REST API
//!
//! Account registration, credential login, bearer-token verification, and
//! profile storage over an injected identity store.

pub mod account;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Assemble the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    //! Test utilities: router and state over the in-memory store

    use crate::auth::{HasherParams, PasswordHasher};
    use crate::state::AppState;
    use axum::Router;
    use std::sync::Arc;
    use user_core::store::memory::MemoryIdentityStore;
    use user_core::AppConfig;

    /// State over an in-memory store with a fixed test secret and light
    /// hashing parameters. Also returns the store handle so tests can
    /// mutate it directly.
    pub fn test_state() -> (Arc<AppState>, Arc<MemoryIdentityStore>) {
        let mut config = AppConfig::default();
        config.auth.token_secret = "test-secret".to_string();

        let store = Arc::new(MemoryIdentityStore::new());
        let mut state = AppState::new(config, store.clone());
        state.hasher = PasswordHasher::new(HasherParams::fast());

        (Arc::new(state), store)
    }

    pub fn create_router_for_testing() -> Router {
        let (state, _store) = test_state();
        crate::create_router(state)
    }
}
