use axum::{Router, Server, middleware::from_fn};
use roadmap_backend::{
    AppState,
    config::Config,
    db::create_pool,
    error::{AppError, AppResult},
    init_tracing,
    llm::{OpenAiClient, RetryPolicy, TextGenerator},
    middleware::logger::logger,
    notifications::{ChannelSink, Notifier, TelegramNotifier, run_dispatcher},
    routes,
    services::CoachingService,
    store::{EntityStore, PgStore},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = Config::from_env()?;
    init_tracing(&config.logging());

    let pool = create_pool(&config.database())?;
    let store: Arc<dyn EntityStore> = Arc::new(PgStore::new(pool));

    let generator = OpenAiClient::from_config(&config.llm())?
        .map(|client| Arc::new(client) as Arc<dyn TextGenerator>);
    if generator.is_none() {
        tracing::warn!("LLM_API_KEY not set, coaching uses rule-based templates only");
    }
    let coaching = Arc::new(CoachingService::new(generator, config.llm()));

    let notifier = TelegramNotifier::from_config(&config.notifications())?
        .map(|n| Arc::new(n) as Arc<dyn Notifier>);
    let (events, rx) = ChannelSink::new();
    let retry = RetryPolicy::for_notifications(&config.notifications());
    tokio::spawn(run_dispatcher(rx, store.clone(), notifier, retry));

    let addr: SocketAddr = config
        .server_address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server address: {}", e)))?;
    let state = Arc::new(AppState::new(store, Arc::new(events), coaching, &config));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::public_router())
        .merge(routes::create_router(state))
        .layer(cors)
        .layer(from_fn(logger));

    tracing::info!(%addr, "Server running");
    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;
    Ok(())
}
