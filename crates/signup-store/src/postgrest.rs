//! Signup store backed by a PostgREST (Supabase REST) endpoint.

use crate::{normalize_email, SignupRecord, SignupStore, StoreError, SIGNUPS_TABLE};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const RECORD_COLUMNS: &str = "first_name,last_name,company,email,phone";

/// PostgREST-backed signup store.
///
/// Uses the service key for both the `apikey` header and the bearer
/// token, so row-level security does not apply.
#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    service_key: SecretString,
}

impl PostgrestStore {
    /// Create a new store for the project at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: SecretString::new(service_key.into()),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, SIGNUPS_TABLE)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.service_key.expose_secret();
        request
            .header("apikey", key.as_str())
            .header("Authorization", format!("Bearer {}", key))
    }

    async fn extract_error(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".into());

        if status == StatusCode::CONFLICT {
            return StoreError::Conflict;
        }

        warn!(status = %status, body = %message, "PostgREST request failed");
        StoreError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl SignupStore for PostgrestStore {
    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<SignupRecord>, StoreError> {
        let filter = format!("eq.{}", normalize_email(email));

        let response = self
            .authorized(self.client.get(self.table_url()))
            .query(&[
                ("select", RECORD_COLUMNS),
                ("email", filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::extract_error(response).await);
        }

        let body = response.text().await?;
        let rows: Vec<SignupRecord> = serde_json::from_str(&body)?;
        debug!(found = !rows.is_empty(), "Signup lookup complete");

        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, record))]
    async fn insert(&self, record: &SignupRecord) -> Result<(), StoreError> {
        let response = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::extract_error(response).await);
        }

        debug!("Signup inserted");
        Ok(())
    }
}
