//! Signup submission flow.

use crate::api::SignupApi;
use crate::form::{FormError, SignupForm, SubmissionState};
use crate::phone::DEFAULT_COUNTRY_PREFIX;
use crate::recaptcha::TokenProvider;
use crate::types::{ProcessSignupRequest, SignupStatus, SIGNUP_ACTION};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Records a completed signup as an ad conversion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversionTracker: Send + Sync {
    async fn track_conversion(&self);
}

/// Result of one [`SignupController::submit`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The form did not validate; nothing was sent.
    Invalid,
    Registered,
    Failed(FormError),
}

pub struct SignupController {
    form: SignupForm,
    state: watch::Sender<SubmissionState>,
    tokens: Arc<dyn TokenProvider>,
    api: Arc<dyn SignupApi>,
    conversions: Arc<dyn ConversionTracker>,
    country_prefix: String,
}

impl SignupController {
    pub fn new(
        tokens: Arc<dyn TokenProvider>,
        api: Arc<dyn SignupApi>,
        conversions: Arc<dyn ConversionTracker>,
    ) -> Self {
        let (state, _) = watch::channel(SubmissionState::default());
        Self {
            form: SignupForm::new(),
            state,
            tokens,
            api,
            conversions,
            country_prefix: DEFAULT_COUNTRY_PREFIX.to_string(),
        }
    }

    pub fn with_country_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.country_prefix = prefix.into();
        self
    }

    pub fn form(&self) -> &SignupForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SignupForm {
        &mut self.form
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    /// Watch submission state; `loading` is visible while a submit is in
    /// flight.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// Validate and send the form.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.form.is_valid() {
            self.form.mark_all_touched();
            return SubmitOutcome::Invalid;
        }

        self.state.send_modify(|s| {
            s.form_errors.clear();
            s.loading = true;
        });

        let outcome = self.send().await;

        self.state.send_modify(|s| {
            s.loading = false;
            match outcome {
                SubmitOutcome::Registered => s.submitted = true,
                SubmitOutcome::Failed(e) => {
                    s.submitted = false;
                    s.form_errors.insert(e);
                }
                SubmitOutcome::Invalid => {}
            }
        });

        outcome
    }

    async fn send(&self) -> SubmitOutcome {
        let token = match self.tokens.token(SIGNUP_ACTION).await {
            Ok(token) if !token.is_empty() => token,
            Ok(_) => {
                error!("Challenge returned an empty token");
                return SubmitOutcome::Failed(FormError::TokenUnavailable);
            }
            Err(e) => {
                error!(error = %e, "Challenge token generation failed");
                return SubmitOutcome::Failed(FormError::TokenUnavailable);
            }
        };

        let request =
            ProcessSignupRequest::signup(token, self.form.payload(&self.country_prefix));

        let response = match self.api.process_signup(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Signup processing failed");
                return SubmitOutcome::Failed(FormError::ServerError);
            }
        };

        match response.status {
            SignupStatus::Success => {
                self.conversions.track_conversion().await;
                info!("Signup registered");
                SubmitOutcome::Registered
            }
            SignupStatus::AlreadyRegistered => {
                info!("Signup already registered");
                SubmitOutcome::Failed(FormError::AlreadyRegistered)
            }
            SignupStatus::RecaptchaFailed => {
                warn!("Signup rejected by bot check");
                SubmitOutcome::Failed(FormError::RecaptchaFailed)
            }
            SignupStatus::ServerError => {
                warn!(message = ?response.message, "Signup server error");
                SubmitOutcome::Failed(FormError::ServerError)
            }
        }
    }
}
