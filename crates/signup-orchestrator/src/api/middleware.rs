//! Request middleware: signup throttling and access logging.

use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc, time::Duration, time::Instant};
use tracing::{info, trace, warn};

/// Process-wide limiter shared by every signup request.
pub type GlobalLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const DEFAULT_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(60) {
    Some(n) => n,
    None => NonZeroU32::MIN,
};

/// Signup throttle.
#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<GlobalLimiter>,
    retry_after: Duration,
}

impl RateLimitState {
    /// Allow `per_minute` signups per minute. Zero means the default of 60.
    pub fn new(per_minute: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(DEFAULT_PER_MINUTE));

        Self {
            retry_after: quota.replenish_interval(),
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Limit high enough that tests never hit it.
    pub fn permissive() -> Self {
        Self::new(10_000)
    }

    /// Take one cell from the quota.
    pub fn try_acquire(&self) -> Result<(), ApiError> {
        self.limiter
            .check()
            .map_err(|_| ApiError::RateLimitExceeded {
                retry_after_secs: self.retry_after.as_secs().max(1),
            })
    }
}

/// Reject signups over the global quota with 429.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Err(e) = rate_limit.try_acquire() {
        warn!("Signup rate limit exceeded");
        return Err(e);
    }
    Ok(next.run(request).await)
}

/// One line per request. Only the path is logged, never the query.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if path == "/health" {
        trace!(%method, %path, status = status.as_u16(), elapsed_ms, "Health check");
    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        warn!(%method, %path, status = status.as_u16(), elapsed_ms, "Request failed");
    } else {
        info!(%method, %path, status = status.as_u16(), elapsed_ms, "Request handled");
    }

    response
}
