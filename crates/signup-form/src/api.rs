//! Client for the signup endpoint.

use crate::error::ApiError;
use crate::types::{ProcessSignupRequest, SignupResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Submits a signup and returns the status envelope.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignupApi: Send + Sync {
    async fn process_signup(
        &self,
        request: &ProcessSignupRequest,
    ) -> Result<SignupResponse, ApiError>;
}

/// reqwest-backed [`SignupApi`].
///
/// The anon key, when set, goes out both as `apikey` and as a bearer token,
/// which is what the function gateway in front of the endpoint expects.
#[derive(Clone)]
pub struct HttpSignupApi {
    client: Client,
    endpoint: String,
    anon_key: Option<String>,
}

impl HttpSignupApi {
    pub fn new(
        endpoint: impl Into<String>,
        anon_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            anon_key: anon_key.filter(|k| !k.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SignupApi for HttpSignupApi {
    #[instrument(skip(self, request), fields(endpoint = %self.endpoint))]
    async fn process_signup(
        &self,
        request: &ProcessSignupRequest,
    ) -> Result<SignupResponse, ApiError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.anon_key {
            builder = builder
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Error responses still carry the envelope when the endpoint itself
        // produced them.
        match serde_json::from_str::<SignupResponse>(&body) {
            Ok(envelope) => {
                debug!(status = %status, outcome = ?envelope.status, "Signup response");
                Ok(envelope)
            }
            Err(_) if !status.is_success() => {
                warn!(status = %status, "Signup endpoint returned an error");
                Err(ApiError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
