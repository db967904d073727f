use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agora_api::config::ServerConfig;
use agora_api::router::build_app_router;
use agora_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Failed to load server configuration")?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        database = %config.database_path().display(),
        "Loaded server configuration"
    );

    // --- Database ---
    tokio::fs::create_dir_all(&config.database_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create database directory {}",
                config.database_dir.display()
            )
        })?;

    let database_path = config.database_path();
    let pool = agora_db::connect(&database_path)
        .await
        .with_context(|| format!("Failed to open database {}", database_path.display()))?;
    tracing::info!("Database connection opened");

    agora_db::initialize_schema(&pool)
        .await
        .context("Failed to initialize database schema")?;
    tracing::info!("Database schema initialized");

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!(%addr, "Server is running");

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    let server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = shutdown_tx.send(true);
            })
            .await
    };

    // In-flight requests get `shutdown_timeout_secs` to finish after the
    // signal; whatever is still running after that is dropped.
    let drain_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let drain_deadline = async {
        if shutdown_rx.wait_for(|stopping| *stopping).await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(drain_timeout).await;
    };

    tokio::select! {
        result = server => result.context("Server error")?,
        () = drain_deadline => {
            tracing::warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "Graceful shutdown timed out, dropping in-flight requests"
            );
        }
    }

    // --- Post-shutdown cleanup ---
    pool.close().await;
    tracing::info!("Database connection closed");
    tracing::info!("Graceful shutdown complete");

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter and
/// `LOG_FORMAT=json` switches to one JSON object per line.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "agora_api=debug,agora_db=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
