//! HTTP API for the signup service.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{logging_middleware, rate_limit_middleware, RateLimitState};
pub use types::*;

use crate::orchestrator::SignupOrchestrator;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SignupOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: SignupOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Router with the default signup quota of 60 per minute.
pub fn create_router(state: AppState) -> Router {
    create_router_with_rate_limit(state, RateLimitState::new(60))
}

/// Router with a caller-supplied signup quota.
///
/// Only `/process-signup` is throttled; `/health` stays reachable.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    let signup = Router::new()
        .route(
            "/process-signup",
            post(handlers::process_signup)
                .options(handlers::preflight)
                .fallback(handlers::not_found),
        )
        .layer(axum_middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(signup)
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
