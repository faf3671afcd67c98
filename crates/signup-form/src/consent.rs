//! Cookie consent state.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::info;

pub const ACCEPTED_KEY: &str = "cookiesAccepted";
pub const REJECTED_KEY: &str = "cookiesRejected";

/// Key/value persistence for consent decisions (local storage in a browser).
pub trait ConsentStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

#[derive(Default)]
pub struct MemoryConsentStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryConsentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConsentStore for MemoryConsentStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// What a consent subscriber sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsentSnapshot {
    pub banner_visible: bool,
    pub accepted: bool,
}

/// Records the visitor's cookie decision and drives the banner.
///
/// The banner starts visible only when no decision has been stored yet.
pub struct ConsentManager {
    store: Arc<dyn ConsentStore>,
    state: watch::Sender<ConsentSnapshot>,
}

impl ConsentManager {
    pub fn new(store: Arc<dyn ConsentStore>) -> Self {
        let accepted = store.get(ACCEPTED_KEY).is_some();
        let decided = accepted || store.get(REJECTED_KEY).is_some();
        let (state, _) = watch::channel(ConsentSnapshot {
            banner_visible: !decided,
            accepted,
        });
        Self { store, state }
    }

    pub fn accept(&self) {
        self.store.remove(REJECTED_KEY);
        self.store.set(ACCEPTED_KEY, Utc::now().to_rfc3339());
        info!("Cookies accepted");
        self.publish(Some(false));
    }

    pub fn reject(&self) {
        self.store.remove(ACCEPTED_KEY);
        self.store.set(REJECTED_KEY, Utc::now().to_rfc3339());
        info!("Cookies rejected");
        self.publish(Some(false));
    }

    pub fn clear_accepted(&self) {
        self.store.remove(ACCEPTED_KEY);
        self.publish(None);
    }

    pub fn is_accepted(&self) -> bool {
        self.store.get(ACCEPTED_KEY).is_some()
    }

    pub fn is_rejected(&self) -> bool {
        self.store.get(REJECTED_KEY).is_some()
    }

    /// When consent was given. A value that does not parse counts as absent.
    pub fn accepted_at(&self) -> Option<DateTime<Utc>> {
        self.store
            .get(ACCEPTED_KEY)
            .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
            .map(|t| t.with_timezone(&Utc))
    }

    pub fn banner_visible(&self) -> bool {
        self.state.borrow().banner_visible
    }

    pub fn set_banner_visible(&self, visible: bool) {
        self.publish(Some(visible));
    }

    pub fn subscribe(&self) -> watch::Receiver<ConsentSnapshot> {
        self.state.subscribe()
    }

    fn publish(&self, banner_visible: Option<bool>) {
        let accepted = self.is_accepted();
        self.state.send_if_modified(|current| {
            let next = ConsentSnapshot {
                banner_visible: banner_visible.unwrap_or(current.banner_visible),
                accepted,
            };
            let changed = *current != next;
            *current = next;
            changed
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (ConsentManager, Arc<MemoryConsentStore>) {
        let store = Arc::new(MemoryConsentStore::new());
        (ConsentManager::new(store.clone()), store)
    }

    #[test]
    fn test_fresh_visitor_sees_banner() {
        let (consent, _) = manager();
        assert!(consent.banner_visible());
        assert!(!consent.is_accepted());
        assert!(!consent.is_rejected());
    }

    #[test]
    fn test_accept() {
        let (consent, store) = manager();
        store.set(REJECTED_KEY, "2026-01-01T00:00:00Z".into());

        consent.accept();

        assert!(consent.is_accepted());
        assert!(!consent.is_rejected());
        assert!(!consent.banner_visible());
        assert!(consent.accepted_at().is_some());
    }

    #[test]
    fn test_reject_removes_acceptance() {
        let (consent, store) = manager();
        consent.accept();

        consent.reject();

        assert!(!consent.is_accepted());
        assert!(consent.is_rejected());
        let rejected_at = store.get(REJECTED_KEY).unwrap();
        assert!(DateTime::parse_from_rfc3339(&rejected_at).is_ok());
    }

    #[test]
    fn test_clear_accepted() {
        let (consent, _) = manager();
        consent.accept();
        consent.clear_accepted();
        assert!(!consent.is_accepted());
        assert!(consent.accepted_at().is_none());
    }

    #[test]
    fn test_stored_decision_hides_banner() {
        let store = Arc::new(MemoryConsentStore::new());
        store.set(ACCEPTED_KEY, Utc::now().to_rfc3339());

        let consent = ConsentManager::new(store);
        assert!(!consent.banner_visible());
        assert!(consent.is_accepted());
    }

    #[tokio::test]
    async fn test_changes_are_observable() {
        let (consent, _) = manager();
        let mut rx = consent.subscribe();

        consent.accept();
        rx.changed().await.unwrap();
        assert_eq!(
            *rx.borrow_and_update(),
            ConsentSnapshot {
                banner_visible: false,
                accepted: true
            }
        );

        consent.reject();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().accepted);

        // Hiding an already hidden banner is not a change.
        consent.set_banner_visible(false);
        assert!(!rx.has_changed().unwrap());

        consent.set_banner_visible(true);
        assert!(rx.has_changed().unwrap());
    }
}
