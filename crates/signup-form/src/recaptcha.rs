//! Client-side challenge tokens.

use crate::error::TokenError;
use crate::script::{ScriptLoader, ScriptResource};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

const SCRIPT_URL: &str = "https://www.google.com/recaptcha/api.js";

/// Where the controller is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Browser,
    Server,
}

impl Platform {
    pub fn is_browser(self) -> bool {
        self == Platform::Browser
    }
}

/// Produces a token for an action.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self, action: &str) -> Result<String, TokenError>;
}

/// The loaded challenge script.
#[async_trait]
pub trait ChallengeRuntime: Send + Sync {
    async fn execute(&self, site_key: &str, action: &str) -> Result<String, TokenError>;
}

/// Token source backed by the reCAPTCHA v3 script.
pub struct RecaptchaTokenSource {
    platform: Platform,
    site_key: String,
    script: ScriptResource,
    runtime: Arc<dyn ChallengeRuntime>,
}

impl RecaptchaTokenSource {
    pub fn new(
        platform: Platform,
        site_key: impl Into<String>,
        loader: Arc<dyn ScriptLoader>,
        runtime: Arc<dyn ChallengeRuntime>,
    ) -> Self {
        let site_key = site_key.into();
        let script = ScriptResource::new(format!("{}?render={}", SCRIPT_URL, site_key), loader);
        Self {
            platform,
            site_key,
            script,
            runtime,
        }
    }

    pub fn script(&self) -> &ScriptResource {
        &self.script
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, action: &str) -> Result<String, TokenError> {
        if !self.platform.is_browser() {
            return Err(TokenError::NotBrowser);
        }
        if action.is_empty() {
            return Err(TokenError::EmptyAction);
        }

        self.script.acquire().await?;
        let token = self.runtime.execute(&self.site_key, action).await?;
        debug!("Challenge token issued");
        Ok(token)
    }
}

#[async_trait]
impl TokenProvider for RecaptchaTokenSource {
    async fn token(&self, action: &str) -> Result<String, TokenError> {
        self.execute(action).await
    }
}
