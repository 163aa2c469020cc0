use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seatkeep::clock::SystemClock;
use seatkeep::config::Config;
use seatkeep::crypto;
use seatkeep::db::{AppState, create_pool, init_db};
use seatkeep::error::AppError;
use seatkeep::handlers;
use seatkeep::models::CreateLicense;

const DEMO_LICENSE_ID: &str = "DEMO-0001";
const DEMO_DURATION_SECONDS: i64 = 30 * 86400;
const DEMO_MAX_SEATS: i64 = 3;

#[derive(Parser, Debug)]
#[command(name = "seatkeep")]
#[command(about = "License activation server with per-machine seat limits")]
struct Cli {
    /// Create a demo license and print its key once (dev mode only)
    #[arg(long)]
    seed: bool,

    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

fn seed_dev_data(state: &AppState) {
    let raw_key = crypto::generate_key();
    let input = CreateLicense {
        license_id: DEMO_LICENSE_ID.to_string(),
        raw_key: raw_key.clone(),
        duration_seconds: DEMO_DURATION_SECONDS,
        max_seats: DEMO_MAX_SEATS,
    };

    match state.registry.create(&input) {
        Ok(license) => {
            tracing::info!("============================================");
            tracing::info!("SEEDED DEMO LICENSE");
            tracing::info!("License ID: {}", license.license_id);
            tracing::info!("Key: {}", raw_key);
            tracing::info!(
                "Seats: {}, duration: {}s from first activation",
                license.max_seats,
                license.duration_seconds
            );
            tracing::info!("============================================");
            tracing::info!("SAVE THIS KEY - IT WILL NOT BE SHOWN AGAIN");
            tracing::info!("============================================");
        }
        Err(AppError::DuplicateLicense(_)) => {
            tracing::info!("Demo license already exists, skipping seed");
        }
        Err(e) => {
            tracing::warn!("Failed to seed demo license: {}", e);
        }
    }
}

fn remove_database_files(db_path: &str) {
    tracing::info!("Cleaning up ephemeral database...");
    if let Err(e) = std::fs::remove_file(db_path) {
        tracing::warn!("Failed to remove {}: {}", db_path, e);
    } else {
        tracing::info!("Removed {}", db_path);
    }
    let _ = std::fs::remove_file(format!("{}-journal", db_path));
    let _ = std::fs::remove_file(format!("{}-wal", db_path));
    let _ = std::fs::remove_file(format!("{}-shm", db_path));
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seatkeep=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }
    if config.admin_api_key.is_none() {
        tracing::warn!("ADMIN_API_KEY is not set; admin endpoints will reject all requests");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState::new(
        db_pool,
        Arc::new(SystemClock),
        config.admin_api_key.clone(),
    );

    if cli.seed {
        if config.dev_mode {
            seed_dev_data(&state);
        } else {
            tracing::warn!("--seed flag ignored: not in dev mode (set SEATKEEP_ENV=dev)");
        }
    }

    let app = handlers::app(state, config.rate_limit);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    if cli.ephemeral && !config.dev_mode {
        tracing::warn!("--ephemeral flag ignored: not in dev mode (set SEATKEEP_ENV=dev)");
    }
    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("Seatkeep server listening on {}", addr);

    // Connect info is required by the per-IP rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    if cleanup_on_exit {
        remove_database_files(&config.database_path);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
