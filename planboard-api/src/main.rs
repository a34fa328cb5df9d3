//! # Planboard API Server
//!
//! Serves the projects and memberships API over PostgreSQL.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/planboard cargo run -p planboard-api
//! ```
//!
//! Set `LOG_FORMAT=json` for structured log lines.

use anyhow::Context;
use planboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use planboard_shared::{
    db::{migrations, pool},
    services::{project::PgProjectService, user::PgUserService},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!(
        "Planboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    if config.database.run_migrations {
        migrations::ensure_database_exists(&config.database.url)
            .await
            .context("Failed to prepare database")?;
    }

    let db = pool::create_pool(config.pool_config())
        .await
        .context("Failed to connect to database")?;

    if config.database.run_migrations {
        migrations::run_migrations(&db)
            .await
            .context("Failed to run migrations")?;
    }

    let status = migrations::get_migration_status(&db).await?;
    info!(
        applied = status.applied_migrations,
        latest = ?status.latest_version,
        "Schema ready"
    );

    let bind_address = config.bind_address();
    let state = AppState::new(
        Arc::new(PgProjectService::new(db.clone())),
        Arc::new(PgUserService::new(db.clone())),
        config,
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown signal received, closing database pool...");
    pool::close_pool(db).await;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "planboard_api=debug,planboard_shared=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
}
