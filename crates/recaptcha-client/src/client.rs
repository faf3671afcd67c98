//! reCAPTCHA siteverify HTTP client.

use crate::error::RecaptchaError;
use crate::types::*;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Google's public siteverify endpoint.
pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Server-side reCAPTCHA verifier.
///
/// The secret is stored using `SecretString` so it never shows up in
/// logs or debug output. A client built without a secret rejects every
/// token without calling the endpoint.
#[derive(Clone)]
pub struct RecaptchaClient {
    client: Client,
    verify_url: String,
    secret: Option<SecretString>,
    policy: VerificationPolicy,
}

impl RecaptchaClient {
    /// Create a new verifier.
    pub fn new(
        secret: Option<String>,
        verify_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RecaptchaError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            verify_url: verify_url.into(),
            secret: secret.filter(|s| !s.is_empty()).map(SecretString::new),
            policy: VerificationPolicy::default(),
        })
    }

    /// Replace the acceptance policy.
    pub fn with_policy(mut self, policy: VerificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &VerificationPolicy {
        &self.policy
    }

    /// Whether a server secret is configured.
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify a client token against the siteverify endpoint.
    #[instrument(skip(self, token))]
    pub async fn verify(&self, token: &str) -> Result<Verification, RecaptchaError> {
        let Some(secret) = &self.secret else {
            warn!("No reCAPTCHA secret configured, rejecting token");
            return Ok(Verification::rejected());
        };

        let response = self
            .client
            .post(&self.verify_url)
            .form(&[("secret", secret.expose_secret().as_str()), ("response", token)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            return Err(RecaptchaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: SiteVerifyResponse = serde_json::from_str(&body)?;

        if !parsed.error_codes.is_empty() {
            debug!(error_codes = ?parsed.error_codes, "Siteverify reported errors");
        }

        let verification = Verification::evaluate(&parsed, &self.policy);
        debug!(
            ok = verification.ok,
            score = verification.score,
            action = %verification.action,
            "Token verified"
        );

        Ok(verification)
    }
}
