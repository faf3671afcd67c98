//! Signup intake service - Entry point.

use mail_dispatch::DispatchClient;
use recaptcha_client::{RecaptchaClient, VerificationPolicy};
use signup_orchestrator::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    config::{Config, LogConfig, LogFormat, StoreBackend, StoreConfig},
    SignupOrchestrator,
};
use signup_store::{MemoryStore, PostgrestStore, SignupStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load().and_then(|c| c.validate().map(|_| c)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.log);

    info!("Starting signup orchestrator");

    if let Err(e) = run(config).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    let registry = tracing_subscriber::registry().with(filter);
    match log.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn SignupStore>> {
    match config.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory signup store; records are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgrest => {
            let url = config.url.clone().unwrap_or_default();
            let key = config.service_key.clone().unwrap_or_default();
            info!(url = %url, "Using PostgREST signup store");
            Ok(Arc::new(PostgrestStore::new(url, key, config.timeout)?))
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let verifier = RecaptchaClient::new(
        config.recaptcha.secret.clone(),
        config.recaptcha.verify_url.clone(),
        config.recaptcha.timeout,
    )?
    .with_policy(VerificationPolicy {
        expected_action: config.recaptcha.expected_action.clone(),
        min_score: config.recaptcha.min_score,
    });

    if !verifier.has_secret() {
        warn!("RECAPTCHA__SECRET is not set; every signup will be rejected");
    }

    let store = build_store(&config.store)?;

    let notifier = DispatchClient::new(
        config.mail.endpoint.clone(),
        config.mail.api_key.clone(),
        config.mail.timeout,
    )?;

    let orchestrator = SignupOrchestrator::new(
        Arc::new(verifier),
        store,
        Arc::new(notifier),
        config.mail.admin_to.clone(),
    );

    let state = AppState::new(orchestrator);
    let rate_limit = RateLimitState::new(config.rate_limit.global_per_minute);
    let app = create_router_with_rate_limit(state, rate_limit);

    let addr = SocketAddr::new(
        config
            .server
            .listen_addr
            .parse()
            .unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
