//! Signup persistence.
//!
//! Records live in a `signups` table keyed by normalized email. The
//! orchestrator checks for an existing record before inserting; backends
//! also refuse a second insert for the same email with
//! [`StoreError::Conflict`].

mod error;
mod memory;
mod postgrest;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Table the records are written to.
pub const SIGNUPS_TABLE: &str = "signups";

/// A lead captured by the signup form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRecord {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    /// Normalized email (trimmed, lower-cased).
    pub email: String,
    /// Formatted phone including the country prefix.
    pub phone: String,
}

impl SignupRecord {
    /// Build a record, normalizing the email.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        company: impl Into<String>,
        email: &str,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            company: company.into(),
            email: normalize_email(email),
            phone: phone.into(),
        }
    }
}

/// Persistent signup storage.
#[async_trait]
pub trait SignupStore: Send + Sync {
    /// Look up a record by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<SignupRecord>, StoreError>;

    /// Insert a new record.
    async fn insert(&self, record: &SignupRecord) -> Result<(), StoreError>;
}

/// Normalize an email for use as the dedup key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Short stable digest of an email, for logs.
pub fn email_fingerprint(email: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(normalize_email(email).as_bytes());
    hex::encode(&hasher.finalize()[..8])
}
