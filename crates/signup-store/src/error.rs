//! Signup store errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A record with the same normalized email already exists.
    #[error("Signup already exists for this email")]
    Conflict,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
