//! Load-once third-party scripts.

use crate::error::ScriptError;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Injects and removes script elements in the host page.
#[async_trait]
pub trait ScriptLoader: Send + Sync {
    /// Resolve once `src` has loaded.
    async fn load(&self, src: &str) -> Result<(), ScriptError>;

    /// Remove `src` from the page.
    fn unload(&self, _src: &str) {}
}

type PendingLoad = Shared<BoxFuture<'static, Result<(), ScriptError>>>;

enum State {
    Unloaded,
    Loading { generation: u64, pending: PendingLoad },
    Loaded,
    Failed(ScriptError),
}

/// Snapshot of a [`ScriptResource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStatus {
    Unloaded,
    Loading,
    Loaded,
    Failed(ScriptError),
}

struct Inner {
    state: State,
    generation: u64,
}

/// A script that is loaded at most once at a time.
///
/// Concurrent [`acquire`](ScriptResource::acquire) calls share one in-flight
/// load. A failed load is retried by the next caller. [`release`]
/// (ScriptResource::release) unloads the script; a load that was in flight
/// at that point no longer affects the state.
#[derive(Clone)]
pub struct ScriptResource {
    src: String,
    loader: Arc<dyn ScriptLoader>,
    inner: Arc<Mutex<Inner>>,
}

impl ScriptResource {
    pub fn new(src: impl Into<String>, loader: Arc<dyn ScriptLoader>) -> Self {
        Self {
            src: src.into(),
            loader,
            inner: Arc::new(Mutex::new(Inner {
                state: State::Unloaded,
                generation: 0,
            })),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub async fn status(&self) -> ScriptStatus {
        match &self.inner.lock().await.state {
            State::Unloaded => ScriptStatus::Unloaded,
            State::Loading { .. } => ScriptStatus::Loading,
            State::Loaded => ScriptStatus::Loaded,
            State::Failed(e) => ScriptStatus::Failed(e.clone()),
        }
    }

    pub async fn is_loaded(&self) -> bool {
        matches!(self.inner.lock().await.state, State::Loaded)
    }

    /// Ensure the script is loaded.
    pub async fn acquire(&self) -> Result<(), ScriptError> {
        let (generation, pending) = {
            let mut guard = self.inner.lock().await;
            let inner = &mut *guard;
            match &inner.state {
                State::Loaded => return Ok(()),
                State::Loading {
                    generation,
                    pending,
                } => (*generation, pending.clone()),
                State::Unloaded | State::Failed(_) => {
                    inner.generation += 1;
                    let generation = inner.generation;
                    let loader = self.loader.clone();
                    let src = self.src.clone();
                    debug!(src = %src, "Loading script");
                    let pending = async move { loader.load(&src).await }.boxed().shared();
                    inner.state = State::Loading {
                        generation,
                        pending: pending.clone(),
                    };
                    (generation, pending)
                }
            }
        };

        let result = pending.await;

        let mut inner = self.inner.lock().await;
        let current = matches!(
            inner.state,
            State::Loading { generation: g, .. } if g == generation
        );
        if current {
            inner.state = match &result {
                Ok(()) => State::Loaded,
                Err(e) => {
                    warn!(src = %self.src, error = %e, "Script failed to load");
                    State::Failed(e.clone())
                }
            };
        }
        result
    }

    /// Unload the script and return to `Unloaded`.
    pub async fn release(&self) {
        let mut inner = self.inner.lock().await;
        if !matches!(inner.state, State::Unloaded) {
            self.loader.unload(&self.src);
            inner.state = State::Unloaded;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeLoader;
    use super::*;
    use std::sync::atomic::Ordering;
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_acquire_loads_once() {
        let loader = Arc::new(FakeLoader::default());
        let script = ScriptResource::new("https://cdn.test/a.js", loader.clone());

        assert_eq!(script.status().await, ScriptStatus::Unloaded);
        script.acquire().await.unwrap();
        script.acquire().await.unwrap();

        assert_eq!(script.status().await, ScriptStatus::Loaded);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_acquire_shares_load() {
        let gate = Arc::new(Notify::new());
        let loader = Arc::new(FakeLoader::gated(gate.clone()));
        let script = ScriptResource::new("https://cdn.test/a.js", loader.clone());

        let first = tokio::spawn({
            let script = script.clone();
            async move { script.acquire().await }
        });
        let second = tokio::spawn({
            let script = script.clone();
            async move { script.acquire().await }
        });

        while script.status().await != ScriptStatus::Loading {
            tokio::task::yield_now().await;
        }
        // Stored permit releases the shared load whenever it gets polled.
        gate.notify_one();

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert!(script.is_loaded().await);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let loader = Arc::new(FakeLoader::default());
        loader.fail.store(true, Ordering::SeqCst);
        let script = ScriptResource::new("https://cdn.test/a.js", loader.clone());

        let err = script.acquire().await.unwrap_err();
        assert!(matches!(err, ScriptError::LoadFailed { .. }));
        assert!(matches!(script.status().await, ScriptStatus::Failed(_)));

        loader.fail.store(false, Ordering::SeqCst);
        script.acquire().await.unwrap();
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
        assert!(script.is_loaded().await);
    }

    #[tokio::test]
    async fn test_release_unloads() {
        let loader = Arc::new(FakeLoader::default());
        let script = ScriptResource::new("https://cdn.test/a.js", loader.clone());

        script.release().await;
        assert_eq!(loader.unloads.load(Ordering::SeqCst), 0);

        script.acquire().await.unwrap();
        script.release().await;
        assert_eq!(script.status().await, ScriptStatus::Unloaded);
        assert_eq!(loader.unloads.load(Ordering::SeqCst), 1);

        script.acquire().await.unwrap();
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_release_during_load_keeps_unloaded() {
        let gate = Arc::new(Notify::new());
        let loader = Arc::new(FakeLoader::gated(gate.clone()));
        let script = ScriptResource::new("https://cdn.test/a.js", loader.clone());

        let pending = tokio::spawn({
            let script = script.clone();
            async move { script.acquire().await }
        });
        while script.status().await != ScriptStatus::Loading {
            tokio::task::yield_now().await;
        }

        script.release().await;
        gate.notify_one();
        pending.await.unwrap().unwrap();

        assert_eq!(script.status().await, ScriptStatus::Unloaded);
    }
}
