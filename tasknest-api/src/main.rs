//! # TaskNest API Server
//!
//! Personal task and category management over HTTP, with stateless session
//! tokens and owner-only access to every record.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://... JWT_SECRET=... cargo run -p tasknest-api
//! ```
//!
//! `DATABASE_URL=memory://` runs against a process-local store instead of
//! PostgreSQL.

use std::sync::Arc;

use anyhow::Context;
use tasknest_api::{
    app::{build_router, AppState},
    config::Config,
};
use tasknest_shared::{
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::{MemoryStore, PgStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "tasknest_api=debug,tasknest_shared=debug,tower_http=debug".into()
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!(
        "TaskNest API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;
    let bind_address = config.bind_address();

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    if config.database.is_memory() {
        tracing::warn!("Using in-memory store; all data is lost on exit");

        let state = AppState::new(Arc::new(MemoryStore::new()), config)
            .context("Failed to initialize application state")?;
        let app = build_router(state);

        tracing::info!("Server listening on http://{}", bind_address);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        if !config.api.production {
            ensure_database_exists(&config.database.url)
                .await
                .context("Failed to create database")?;
        }

        let pool = create_pool(DatabaseConfig {
            max_connections: config.database.max_connections,
            ..DatabaseConfig::new(config.database.url.clone())
        })
        .await
        .context("Failed to connect to database")?;

        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        let state = AppState::new(Arc::new(PgStore::new(pool.clone())), config)
            .context("Failed to initialize application state")?;
        let app = build_router(state);

        tracing::info!("Server listening on http://{}", bind_address);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        close_pool(&pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}
