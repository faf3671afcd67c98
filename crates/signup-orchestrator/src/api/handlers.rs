//! HTTP request handlers.

use super::types::{HealthResponse, ProcessSignupRequest, SignupResponse, SIGNUP_ACTION};
use super::AppState;
use crate::error::ApiError;
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use tracing::{info, warn};

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Process a signup submission.
///
/// The body is parsed by hand so a malformed request gets the status
/// envelope with a 400 rather than an extractor rejection.
pub async fn process_signup(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SignupResponse>, ApiError> {
    let request: ProcessSignupRequest = serde_json::from_slice(&body)?;

    if request.action.as_deref() != Some(SIGNUP_ACTION) {
        warn!(action = ?request.action, "Rejected signup with unexpected action");
        return Err(ApiError::BadRequest("action must be \"signup\"".into()));
    }

    let token = request
        .recaptcha_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("recaptchaToken is required".into()))?;

    let payload = request
        .payload
        .ok_or_else(|| ApiError::BadRequest("payload is required".into()))?;

    if let Some(field) = payload.first_blank_field() {
        warn!(field, "Rejected signup with blank field");
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }

    let response = state.orchestrator.process(&token, payload).await;
    info!(status = ?response.status, "Signup processed");

    Ok(Json(response))
}

/// `OPTIONS` on the signup route.
pub async fn preflight() -> &'static str {
    "ok"
}

/// Any method other than `POST`/`OPTIONS` on the signup route.
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}
