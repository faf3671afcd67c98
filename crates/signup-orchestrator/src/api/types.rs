//! API request and response types.

use serde::{Deserialize, Serialize};

/// Action name the signup endpoint accepts.
pub const SIGNUP_ACTION: &str = "signup";

/// Request body of `POST /process-signup`.
///
/// Every field is optional at the wire level so a missing one can be
/// answered with the status envelope instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ProcessSignupRequest {
    pub action: Option<String>,

    #[serde(rename = "recaptchaToken")]
    pub recaptcha_token: Option<String>,

    pub payload: Option<SignupPayload>,
}

/// Signup form values as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupPayload {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
}

impl SignupPayload {
    /// Name of the first required field that is blank.
    pub fn first_blank_field(&self) -> Option<&'static str> {
        [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("company", &self.company),
            ("email", &self.email),
            ("phone", &self.phone),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// Terminal status of a signup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupStatus {
    Success,
    AlreadyRegistered,
    RecaptchaFailed,
    ServerError,
}

/// Envelope every signup response uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupResponse {
    pub status: SignupStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SignupResponse {
    pub fn new(status: SignupStatus) -> Self {
        Self {
            status,
            message: None,
        }
    }

    pub fn with_message(status: SignupStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}
