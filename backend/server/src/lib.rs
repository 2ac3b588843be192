//! Documentation of the portfolio site backend.
//!
//! The site itself is static. This backend only records what visitors do
//! and lets the owner read it back.
//!
//!
//!
//! # Surface
//!
//! | Method & Path | Body | Success |
//! |---|---|---|
//! | `POST /contact` | `{name, email, subject, message}` | `{success, message}` |
//! | `POST /track-project-view` | `{projectId, projectTitle?}` | `{success, views}` |
//! | `GET /admin/contacts` | | `{success, submissions}` newest first |
//! | `GET /admin/analytics` | | `{success, analytics}` most viewed first |
//! | `GET /health` | | `{status: "healthy", timestamp}` |
//!
//! - Missing fields answer 400 `{error}`, store failures 500 `{error}`
//! - Every route can be nested under `ROUTE_PREFIX`, e.g. `/make-server-1a91da27`
//! - Any origin may call; the browser sends the public API key as a bearer token
//!
//!
//!
//! # Storage
//!
//! Everything lives in a key-value store, see [`store`].
//!
//! | Key | Value |
//! |---|---|
//! | `contact_<millis>_<rand>` | one [`wire::ContactSubmission`] |
//! | `contact_submissions` | ordered index of submission ids |
//! | `project_views_<id>` | view counter |
//! | `project_info_<id>` | `{id, title, firstViewed, lastViewed}` |
//!
//! Counters use an atomic increment and submissions are written together
//! with their index entry, so concurrent requests neither lose views nor
//! leave dangling ids.
//!
//!
//!
//! # Security
//!
//! The admin routes are protected by a single shared token at most
//! (`/run/secrets/ADMIN_TOKEN`). Without that file they are readable by
//! anyone who knows the URL, and startup logs a warning saying so.
//!
//!
//!
//! # Setup
//!
//! Run against a local Redis.
//! ```sh
//! REDIS_URL=redis://localhost:6379 cargo run -p portfolio
//! ```
//!
//! Run without Redis.
//! ```sh
//! KV_BACKEND=memory RUST_LOG=info cargo run -p portfolio
//! ```
//!
//! Poke a running server.
//! ```sh
//! cargo run -p tester -- --url http://localhost:1111 health
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::from_fn_with_state,
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod analytics;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;
pub mod submissions;
pub mod utils;
pub mod views;

use auth::require_admin_token;
use config::Config;
use routes::{
    analytics_handler, contact_handler, contacts_handler, health_handler, track_view_handler,
};
use state::State;
use wire::{ADMIN_ANALYTICS_PATH, ADMIN_CONTACTS_PATH, CONTACT_PATH, HEALTH_PATH, TRACK_VIEW_PATH};

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = State::new(config).await?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

/// Full router with CORS and request tracing, nested under the configured
/// route prefix.
pub fn app(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let admin = Router::new()
        .route(ADMIN_CONTACTS_PATH, get(contacts_handler))
        .route(ADMIN_ANALYTICS_PATH, get(analytics_handler))
        .route_layer(from_fn_with_state(state.clone(), require_admin_token));

    let routes = Router::new()
        .route(CONTACT_PATH, post(contact_handler))
        .route(TRACK_VIEW_PATH, post(track_view_handler))
        .route(HEALTH_PATH, get(health_handler))
        .merge(admin);

    let routes = match state.config.route_prefix.as_str() {
        "" => routes,
        prefix => Router::new().nest(prefix, routes),
    };

    routes
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
