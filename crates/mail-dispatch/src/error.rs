//! Mail dispatch errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Send failed: {status} - {message}")]
    SendFailed { status: u16, message: String },
}
