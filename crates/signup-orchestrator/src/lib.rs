//! Signup intake service.
//!
//! Accepts the landing page's signup form submissions and:
//! - Confirms the reCAPTCHA token server-side
//! - Deduplicates by normalized email
//! - Persists new signups
//! - Sends confirmation and admin emails on a best-effort basis

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;

pub use config::Config;
pub use error::ApiError;
pub use orchestrator::{SignupOrchestrator, TokenVerifier};
