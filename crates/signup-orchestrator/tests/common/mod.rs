//! Common test doubles for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use mail_dispatch::{DispatchError, EmailData, Notifier};
use recaptcha_client::{RecaptchaError, Verification};
use signup_orchestrator::api::SignupPayload;
use signup_orchestrator::{SignupOrchestrator, TokenVerifier};
use signup_store::{MemoryStore, SignupRecord, SignupStore, StoreError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ADMIN_TO: &str = "admin@acme.io";

/// Verifier that returns a fixed outcome. `None` simulates a transport error.
pub struct StaticVerifier {
    outcome: Option<Verification>,
    pub calls: AtomicUsize,
}

impl StaticVerifier {
    pub fn accepting() -> Self {
        Self::with(Some(Verification {
            ok: true,
            score: 0.9,
            action: "signup".into(),
        }))
    }

    pub fn rejecting() -> Self {
        Self::with(Some(Verification {
            ok: false,
            score: 0.5,
            action: "signup".into(),
        }))
    }

    pub fn unreachable() -> Self {
        Self::with(None)
    }

    fn with(outcome: Option<Verification>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, _token: &str) -> Result<Verification, RecaptchaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().ok_or(RecaptchaError::Api {
            status: 503,
            message: "unavailable".into(),
        })
    }
}

/// Store whose lookups or inserts fail.
#[derive(Default)]
pub struct FailingStore {
    pub fail_lookup: bool,
    pub conflict_on_insert: bool,
    pub inserts: AtomicUsize,
}

#[async_trait]
impl SignupStore for FailingStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<SignupRecord>, StoreError> {
        if self.fail_lookup {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(None)
    }

    async fn insert(&self, _record: &SignupRecord) -> Result<(), StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.conflict_on_insert {
            return Err(StoreError::Conflict);
        }
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Confirmation { to: String },
    Admin { to: String, duplicate: bool },
}

/// Notifier that records every send and optionally fails them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub fail: bool,
    sent: Mutex<Vec<Sent>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, sent: Sent) -> Result<(), DispatchError> {
        self.sent.lock().unwrap().push(sent);
        if self.fail {
            return Err(DispatchError::SendFailed {
                status: 500,
                message: "mail provider down".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_confirmation(&self, _data: &EmailData, to: &str) -> Result<(), DispatchError> {
        self.record(Sent::Confirmation { to: to.into() })
    }

    async fn send_admin_notification(
        &self,
        _data: &EmailData,
        to: &str,
        duplicate: bool,
    ) -> Result<(), DispatchError> {
        self.record(Sent::Admin {
            to: to.into(),
            duplicate,
        })
    }
}

pub fn payload(email: &str) -> SignupPayload {
    SignupPayload {
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        company: "Acme".into(),
        email: email.into(),
        phone: "+359 898-353-650".into(),
    }
}

pub fn orchestrator(
    verifier: Arc<dyn TokenVerifier>,
    store: Arc<dyn SignupStore>,
    notifier: Arc<dyn Notifier>,
) -> SignupOrchestrator {
    SignupOrchestrator::new(verifier, store, notifier, ADMIN_TO)
}

/// Orchestrator over an accepting verifier, a memory store and a recorder.
pub fn happy_path() -> (SignupOrchestrator, MemoryStore, Arc<RecordingNotifier>) {
    let store = MemoryStore::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let orchestrator = orchestrator(
        Arc::new(StaticVerifier::accepting()),
        Arc::new(store.clone()),
        notifier.clone(),
    );
    (orchestrator, store, notifier)
}
