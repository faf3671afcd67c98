//! Signup notification emails.
//!
//! Sends go through an HTTP dispatch endpoint that owns the templates.
//! Callers treat every send as best-effort.

mod client;
mod error;
mod types;

pub use client::DispatchClient;
pub use error::DispatchError;
pub use types::*;

use async_trait::async_trait;

/// Outbound signup notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Receipt to the person who signed up.
    async fn send_confirmation(&self, data: &EmailData, to: &str) -> Result<(), DispatchError>;

    /// Alert to the admin inbox. `duplicate` marks a repeated signup.
    async fn send_admin_notification(
        &self,
        data: &EmailData,
        to: &str,
        duplicate: bool,
    ) -> Result<(), DispatchError>;
}
