//! HTTP-facing errors.
//!
//! Business outcomes (verification failure, lookup or insert failure) are
//! answered with a 200 and a status envelope, so they never become an
//! `ApiError`. What is left is malformed input and throttling.

use crate::api::{SignupResponse, SignupStatus};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                Json(SignupResponse::with_message(
                    SignupStatus::ServerError,
                    "Bad request",
                )),
            )
                .into_response(),
            ApiError::RateLimitExceeded { retry_after_secs } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(SignupResponse::with_message(
                        SignupStatus::ServerError,
                        "Too many requests, please try again later.",
                    )),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                response
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("Invalid JSON body: {}", e))
    }
}
