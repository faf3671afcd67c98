//! Signup orchestration.
//!
//! One request runs: verify token → look up email → insert → notify.
//! Verification, lookup and insert end the flow with a defined status when
//! they fail. Notifications are best-effort and never change the status.

use crate::api::{SignupPayload, SignupResponse, SignupStatus};
use async_trait::async_trait;
use mail_dispatch::{EmailData, Notifier};
use recaptcha_client::{RecaptchaClient, RecaptchaError, Verification};
use signup_store::{email_fingerprint, SignupRecord, SignupStore, StoreError};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Message sent with `server_error` outcomes.
pub const RETRY_LATER_MESSAGE: &str = "Please try again later.";

/// Server-side half of the bot-verification gate.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Verification, RecaptchaError>;
}

#[async_trait]
impl TokenVerifier for RecaptchaClient {
    async fn verify(&self, token: &str) -> Result<Verification, RecaptchaError> {
        RecaptchaClient::verify(self, token).await
    }
}

/// Composes the gate, the store and the notifier into one request flow.
#[derive(Clone)]
pub struct SignupOrchestrator {
    verifier: Arc<dyn TokenVerifier>,
    store: Arc<dyn SignupStore>,
    notifier: Arc<dyn Notifier>,
    admin_to: String,
}

impl SignupOrchestrator {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        store: Arc<dyn SignupStore>,
        notifier: Arc<dyn Notifier>,
        admin_to: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            store,
            notifier,
            admin_to: admin_to.into(),
        }
    }

    /// Run one signup to completion.
    #[instrument(skip_all, fields(email = %email_fingerprint(&payload.email)))]
    pub async fn process(&self, token: &str, payload: SignupPayload) -> SignupResponse {
        match self.verifier.verify(token).await {
            Ok(v) if v.ok => {
                info!(score = v.score, "Token accepted");
            }
            Ok(v) => {
                warn!(score = v.score, action = %v.action, "Token rejected");
                return SignupResponse::new(SignupStatus::RecaptchaFailed);
            }
            Err(e) => {
                warn!(error = %e, "Token verification failed");
                return SignupResponse::new(SignupStatus::RecaptchaFailed);
            }
        }

        let record = SignupRecord::new(
            payload.first_name,
            payload.last_name,
            payload.company,
            &payload.email,
            payload.phone,
        );
        let data = email_data(&record);

        match self.store.find_by_email(&record.email).await {
            Ok(Some(_)) => {
                info!("Signup already registered");
                self.notify_duplicate(&data).await;
                return SignupResponse::new(SignupStatus::AlreadyRegistered);
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "Signup lookup failed");
                return SignupResponse::with_message(SignupStatus::ServerError, RETRY_LATER_MESSAGE);
            }
        }

        match self.store.insert(&record).await {
            Ok(()) => {}
            Err(StoreError::Conflict) => {
                // Lost a race with a concurrent signup for the same email.
                info!("Signup inserted concurrently");
                self.notify_duplicate(&data).await;
                return SignupResponse::new(SignupStatus::AlreadyRegistered);
            }
            Err(e) => {
                error!(error = %e, "Signup insert failed");
                return SignupResponse::with_message(SignupStatus::ServerError, RETRY_LATER_MESSAGE);
            }
        }

        info!("Signup stored");
        self.notify_new(&data, &record.email).await;

        SignupResponse::new(SignupStatus::Success)
    }

    async fn notify_duplicate(&self, data: &EmailData) {
        if let Err(e) = self
            .notifier
            .send_admin_notification(data, &self.admin_to, true)
            .await
        {
            warn!(error = %e, "Admin email (duplicate) failed");
        }
    }

    async fn notify_new(&self, data: &EmailData, to: &str) {
        let (confirmation, admin) = futures::join!(
            self.notifier.send_confirmation(data, to),
            self.notifier
                .send_admin_notification(data, &self.admin_to, false),
        );

        if let Err(e) = confirmation {
            warn!(error = %e, "Confirmation email failed");
        }
        if let Err(e) = admin {
            warn!(error = %e, "Admin email failed");
        }
    }
}

fn email_data(record: &SignupRecord) -> EmailData {
    EmailData {
        first_name: record.first_name.clone(),
        last_name: record.last_name.clone(),
        company: record.company.clone(),
        phone: record.phone.clone(),
        email: record.email.clone(),
    }
}
