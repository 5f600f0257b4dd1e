//! API route definitions

use crate::auth::middleware::session_gate;
use crate::handlers::{account, auth, profile};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Create API routes
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/v1/register", post(auth::register_handler))
        .route("/v1/login", post(auth::login_handler));

    // Protected routes (session gate)
    let protected_routes = Router::new()
        .route(
            "/v1/user",
            get(account::get_account_handler).put(account::update_account_handler),
        )
        .route(
            "/v1/profile",
            post(profile::create_profile_handler)
                .get(profile::get_profile_handler)
                .put(profile::update_profile_handler),
        )
        .route_layer(middleware::from_fn_with_state(state, session_gate));

    // Service-to-service routes, exposed on the private network only
    let private_routes = Router::new()
        .route("/private/user/validate", get(auth::validate_handler))
        .route("/private/user/profile", get(profile::private_profile_handler));

    // Combine routes
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(private_routes)
}
