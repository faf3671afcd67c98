//! Consent-gated analytics and ad conversion tracking.

use crate::consent::ConsentManager;
use crate::controller::ConversionTracker;
use crate::error::ScriptError;
use crate::recaptcha::Platform;
use crate::script::{ScriptLoader, ScriptResource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

const TAG_SCRIPT_URL: &str = "https://www.googletagmanager.com/gtag/js";

/// One `gtag(...)` call.
#[derive(Debug, Clone, PartialEq)]
pub enum TagCommand {
    Js(DateTime<Utc>),
    Config { target: String, params: Option<Value> },
    Event { name: String, params: Value },
}

impl TagCommand {
    /// The argument list as pushed onto the data layer.
    pub fn to_args(&self) -> Value {
        match self {
            TagCommand::Js(at) => json!(["js", at.to_rfc3339()]),
            TagCommand::Config {
                target,
                params: Some(params),
            } => json!(["config", target, params]),
            TagCommand::Config { target, params: None } => json!(["config", target]),
            TagCommand::Event { name, params } => json!(["event", name, params]),
        }
    }
}

/// Receives tag commands (the page's data layer).
pub trait TagSink: Send + Sync {
    fn push(&self, command: TagCommand);
    fn clear(&self);
}

/// In-process data layer.
#[derive(Default)]
pub struct DataLayer {
    commands: Mutex<Vec<TagCommand>>,
}

impl DataLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<TagCommand> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TagSink for DataLayer {
    fn push(&self, command: TagCommand) {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
    }

    fn clear(&self) {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub measurement_id: String,
    pub ads_id: String,
    pub conversion_label: String,
    pub conversion_value: f64,
    pub conversion_currency: String,
}

pub struct Analytics {
    platform: Platform,
    consent: Arc<ConsentManager>,
    script: ScriptResource,
    tags: Arc<dyn TagSink>,
    config: AnalyticsConfig,
    initialized: AtomicBool,
    path: Mutex<String>,
}

impl Analytics {
    pub fn new(
        platform: Platform,
        consent: Arc<ConsentManager>,
        loader: Arc<dyn ScriptLoader>,
        tags: Arc<dyn TagSink>,
        config: AnalyticsConfig,
    ) -> Self {
        let src = format!("{}?id={}", TAG_SCRIPT_URL, config.measurement_id);
        Self {
            platform,
            consent,
            script: ScriptResource::new(src, loader),
            tags,
            config,
            initialized: AtomicBool::new(false),
            path: Mutex::new("/".to_string()),
        }
    }

    pub fn script(&self) -> &ScriptResource {
        &self.script
    }

    fn current_path(&self) -> String {
        self.path
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Load the tag script. Refused outside a browser or without consent.
    pub async fn load(&self) -> Result<(), ScriptError> {
        if !self.platform.is_browser() {
            return Err(ScriptError::NotBrowser);
        }
        if !self.consent.is_accepted() {
            return Err(ScriptError::ConsentRequired(self.script.src().to_string()));
        }

        self.script.acquire().await?;

        if !self.initialized.swap(true, Ordering::SeqCst) {
            self.tags.push(TagCommand::Js(Utc::now()));
            self.tags.push(TagCommand::Config {
                target: self.config.measurement_id.clone(),
                params: Some(json!({ "page_path": self.current_path() })),
            });
            self.tags.push(TagCommand::Config {
                target: self.config.ads_id.clone(),
                params: None,
            });
            info!(measurement_id = %self.config.measurement_id, "Analytics initialized");
        }
        Ok(())
    }

    /// Remove the tag script and clear the data layer.
    pub async fn unload(&self) {
        self.script.release().await;
        self.tags.clear();
        self.initialized.store(false, Ordering::SeqCst);
        info!("Analytics unloaded");
    }

    /// Bring the script in line with the stored consent decision.
    pub async fn sync_with_consent(&self) {
        if !self.platform.is_browser() {
            return;
        }

        let consented = self.consent.is_accepted();
        let loaded = self.script.is_loaded().await;
        if consented && !loaded {
            if let Err(e) = self.load().await {
                error!(error = %e, "Failed to load analytics script");
            }
        } else if !consented && loaded {
            self.unload().await;
        }
    }

    /// Re-sync whenever the visitor's decision changes, starting with the
    /// current one.
    pub fn spawn_consent_watch(self: &Arc<Self>) -> JoinHandle<()> {
        let analytics = self.clone();
        let mut changes = self.consent.subscribe();
        tokio::spawn(async move {
            analytics.sync_with_consent().await;
            while changes.changed().await.is_ok() {
                let snapshot = *changes.borrow_and_update();
                if !snapshot.banner_visible {
                    analytics.sync_with_consent().await;
                }
            }
        })
    }

    async fn enabled(&self) -> bool {
        self.platform.is_browser() && self.consent.is_accepted() && self.script.is_loaded().await
    }

    pub async fn track_page_view(&self, path: &str) {
        *self.path.lock().unwrap_or_else(PoisonError::into_inner) = path.to_string();

        if !self.enabled().await {
            return;
        }
        self.tags.push(TagCommand::Config {
            target: self.config.measurement_id.clone(),
            params: Some(json!({ "page_path": path })),
        });
    }

    /// Record an ad conversion, falling back to the configured value and
    /// currency.
    pub async fn track_conversion_with(&self, value: Option<f64>, currency: Option<&str>) {
        if !self.enabled().await {
            debug!("Conversion not tracked: analytics disabled");
            return;
        }
        self.tags.push(TagCommand::Event {
            name: "conversion".to_string(),
            params: json!({
                "send_to": format!("{}/{}", self.config.ads_id, self.config.conversion_label),
                "value": value.unwrap_or(self.config.conversion_value),
                "currency": currency.unwrap_or(&self.config.conversion_currency),
            }),
        });
    }
}

#[async_trait]
impl ConversionTracker for Analytics {
    async fn track_conversion(&self) {
        self.track_conversion_with(None, None).await;
    }
}
