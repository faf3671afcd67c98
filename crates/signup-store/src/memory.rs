//! In-memory signup store.

use crate::{normalize_email, SignupRecord, SignupStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

struct StoredSignup {
    record: SignupRecord,
    created_at: DateTime<Utc>,
}

/// Signup store kept in process memory.
///
/// Records are indexed by normalized email, so the map itself enforces
/// one record per email.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, StoredSignup>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// When the record for an email was inserted.
    pub async fn created_at(&self, email: &str) -> Option<DateTime<Utc>> {
        self.records
            .read()
            .await
            .get(&normalize_email(email))
            .map(|s| s.created_at)
    }

    /// All records, oldest first.
    pub async fn list_all(&self) -> Vec<SignupRecord> {
        let records = self.records.read().await;
        let mut stored: Vec<&StoredSignup> = records.values().collect();
        stored.sort_by_key(|s| s.created_at);
        stored.into_iter().map(|s| s.record.clone()).collect()
    }
}

#[async_trait]
impl SignupStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<SignupRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .get(&normalize_email(email))
            .map(|s| s.record.clone()))
    }

    async fn insert(&self, record: &SignupRecord) -> Result<(), StoreError> {
        let key = normalize_email(&record.email);
        let mut records = self.records.write().await;

        if records.contains_key(&key) {
            return Err(StoreError::Conflict);
        }

        records.insert(
            key,
            StoredSignup {
                record: record.clone(),
                created_at: Utc::now(),
            },
        );
        debug!(total = records.len(), "Stored signup");

        Ok(())
    }
}
