//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::sync::Arc;

use auth::{AuthGate, PgAuthRepository, SessionManager, auth_router, spawn_session_sweeper};
use axum::{
    Router, http,
    http::{Method, header},
    routing::get,
};
use chrono::Utc;
use reaction::{
    PgReactionRepository, ReactionConfig, reaction_protected_router, reaction_public_router,
};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,reaction=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    // Database connection; every connection gets server-side timeouts
    let statement_timeout = config.db_statement_timeout.as_millis().to_string();
    let connect_options: PgConnectOptions = config.database_url.parse()?;
    let connect_options = connect_options.options([
        ("statement_timeout", statement_timeout.as_str()),
        ("idle_in_transaction_session_timeout", statement_timeout.as_str()),
    ]);

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .connect_with(connect_options)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Build the dummy hash before the first login needs it
    if !platform::password::warm_up() {
        tracing::warn!("Dummy password hash unavailable, unknown-email logins will hash inline");
    }

    let auth_config = Arc::new(config.auth.clone());
    let auth_repo = Arc::new(PgAuthRepository::new(pool.clone()));
    let sessions = SessionManager::new(auth_repo.clone(), auth_config.clone());

    // Startup cleanup: remove expired sessions
    // Errors here should not prevent server startup
    match sessions.sweep_expired(Utc::now()).await {
        Ok(deleted) => {
            tracing::info!(sessions_deleted = deleted, "Session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session cleanup failed, continuing anyway");
        }
    }

    let shutdown = CancellationToken::new();
    let sweeper = spawn_session_sweeper(sessions, config.session_sweep_interval, shutdown.clone());

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_credentials(true);

    // Build router
    let reaction_repo = Arc::new(PgReactionRepository::new(pool.clone()));
    let reaction_config = Arc::new(ReactionConfig::default());

    let public = Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_router(auth_repo.clone(), auth_config.clone()))
        .merge(reaction_public_router(reaction_repo.clone(), reaction_config.clone()));
    let protected = reaction_protected_router(reaction_repo, reaction_config);

    let app = AuthGate::new(auth_repo, auth_config)
        .apply(public, protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "Session sweeper did not stop cleanly");
    }
    pool.close().await;

    tracing::info!("Server stopped");

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                ctrl_c.await.ok();
                tracing::info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        tracing::info!("Received Ctrl+C, shutting down...");
    }
}
