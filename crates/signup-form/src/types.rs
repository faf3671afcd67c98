//! Wire types for the signup endpoint.

use serde::{Deserialize, Serialize};

/// Action name the token is requested for and the endpoint expects.
pub const SIGNUP_ACTION: &str = "signup";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupPayload {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSignupRequest {
    pub action: String,
    #[serde(rename = "recaptchaToken")]
    pub recaptcha_token: String,
    pub payload: SignupPayload,
}

impl ProcessSignupRequest {
    pub fn signup(recaptcha_token: impl Into<String>, payload: SignupPayload) -> Self {
        Self {
            action: SIGNUP_ACTION.to_string(),
            recaptcha_token: recaptcha_token.into(),
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupStatus {
    Success,
    AlreadyRegistered,
    RecaptchaFailed,
    ServerError,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignupResponse {
    pub status: SignupStatus,
    #[serde(default)]
    pub message: Option<String>,
}
