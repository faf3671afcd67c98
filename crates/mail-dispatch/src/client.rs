//! HTTP client for the mail dispatch endpoint.

use crate::error::DispatchError;
use crate::types::*;
use crate::Notifier;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Posts `{ data, to, type, subject }` to the dispatch endpoint, which
/// renders the template and hands the message to the mail provider.
#[derive(Clone)]
pub struct DispatchClient {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl DispatchClient {
    /// Create a new dispatch client.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DispatchError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.is_empty()).map(SecretString::new),
        })
    }

    /// Send one templated email.
    #[instrument(skip(self, data, to))]
    pub async fn dispatch(
        &self,
        kind: EmailKind,
        data: &EmailData,
        to: &str,
        subject: &str,
    ) -> Result<(), DispatchError> {
        let request = DispatchRequest {
            data,
            to,
            kind,
            subject,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header(
                "Authorization",
                format!("Bearer {}", key.expose_secret()),
            );
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, "Mail dispatch failed");
            return Err(DispatchError::SendFailed {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Mail dispatched");
        Ok(())
    }
}

#[async_trait]
impl Notifier for DispatchClient {
    async fn send_confirmation(&self, data: &EmailData, to: &str) -> Result<(), DispatchError> {
        self.dispatch(EmailKind::Confirmation, data, to, CONFIRMATION_SUBJECT)
            .await
    }

    async fn send_admin_notification(
        &self,
        data: &EmailData,
        to: &str,
        duplicate: bool,
    ) -> Result<(), DispatchError> {
        let subject = if duplicate {
            DUPLICATE_NOTIFICATION_SUBJECT
        } else {
            NOTIFICATION_SUBJECT
        };
        self.dispatch(EmailKind::Notification, data, to, subject)
            .await
    }
}
