//! Signup form errors.

use thiserror::Error;

/// Failure to load a third-party script.
///
/// Cloneable because one load result is shared by every caller waiting
/// on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Scripts can only be loaded in a browser context")]
    NotBrowser,

    #[error("User consent required to load {0}")]
    ConsentRequired(String),

    #[error("Failed to load {src}: {reason}")]
    LoadFailed { src: String, reason: String },
}

/// Failure to obtain a challenge token.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token generation can only be executed in a browser context")]
    NotBrowser,

    #[error("Action parameter is required")]
    EmptyAction,

    #[error("Challenge script unavailable: {0}")]
    Script(#[from] ScriptError),

    #[error("Challenge runtime error: {0}")]
    Runtime(String),
}

/// Failure to reach the signup endpoint.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
