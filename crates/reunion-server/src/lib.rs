pub mod community;
pub mod config;
pub mod error;
pub mod game;
pub mod health;
pub mod state;
pub mod store;
pub mod survey;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use config::ServerConfig;
use state::{AppState, SharedStore};
use store::{MemoryStore, StoreError};

/// Build the Axum router and application state from a config and a store.
pub fn build_app(config: ServerConfig, store: SharedStore) -> (Router<()>, AppState) {
    let web_root = config.web_root.clone();
    let timeout = Duration::from_secs(config.limits.request_timeout_secs);
    let body_limit = config.limits.max_body_bytes;
    let state = AppState::new(config, store);

    let game_routes = Router::new()
        .route("/guess", post(game::submit_guess))
        .route("/leaderboard", get(game::get_leaderboard))
        .route("/target", get(game::get_target));

    let analytics_routes = Router::new()
        .route("/summary", get(survey::get_summary))
        .route("/event-types", get(survey::get_event_types))
        .route("/current-status", get(survey::get_current_status))
        .route("/venues", get(survey::get_venues))
        .route("/budget", get(survey::get_budget))
        .route("/location", get(survey::get_location))
        .route("/alcohol", get(survey::get_alcohol));

    let api_routes = Router::new()
        .route("/survey", post(survey::submit_survey))
        .route("/posts", get(community::list_posts).post(community::create_post))
        .route("/comments", post(community::create_comment))
        .route("/reactions", post(community::create_reaction))
        .nest("/game", game_routes)
        .nest("/analytics", analytics_routes)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(&web_root))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}

/// Pick the storage backend from config: PostgreSQL when a database URL is
/// configured and the `postgres` feature is compiled in, memory otherwise.
pub async fn open_store(config: &ServerConfig) -> Result<SharedStore, StoreError> {
    match config.database.url.as_deref() {
        #[cfg(feature = "postgres")]
        Some(url) => {
            let store = store::PgStore::connect(url, &config.database).await?;
            tracing::info!("Connected to PostgreSQL");
            Ok(Arc::new(store))
        },
        #[cfg(not(feature = "postgres"))]
        Some(_) => {
            tracing::warn!(
                "database.url is set but the server was built without the `postgres` feature; \
                 using in-memory storage"
            );
            Ok(Arc::new(MemoryStore::new()))
        },
        None => {
            tracing::info!("No database configured, using in-memory storage");
            Ok(Arc::new(MemoryStore::new()))
        },
    }
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
