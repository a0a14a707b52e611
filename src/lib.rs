pub mod analytics;
pub mod coaching;
pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod llm;
pub mod middleware;
pub mod notifications;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;
pub mod validation;

use crate::config::{Config, LoggingConfig};
use crate::middleware::auth::{AuthConfig, AuthService};
use crate::notifications::EventSink;
use crate::services::CoachingService;
use crate::store::EntityStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub events: Arc<dyn EventSink>,
    pub coaching: Arc<CoachingService>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EntityStore>,
        events: Arc<dyn EventSink>,
        coaching: Arc<CoachingService>,
        config: &Config,
    ) -> Self {
        let auth_service = AuthService::new(AuthConfig::new(config.jwt_secret.clone()));
        Self {
            store,
            events,
            coaching,
            auth_service: Arc::new(auth_service),
        }
    }
}

pub fn init_tracing(config: &LoggingConfig) {
    let level_filter = match config.level.as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };
    // RUST_LOG wins over LOG_LEVEL when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_filter));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .init();
        }
    }
}
