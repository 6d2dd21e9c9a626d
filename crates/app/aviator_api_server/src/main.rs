//! Aviator API server binary.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use aviator_core::mail::brevo::BrevoMailer;
use aviator_core::mail::{LogMailer, Mailer};
use aviator_core::store::{CredentialStore, MemoryCredentialStore, PgCredentialStore};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "aviator_api_server", about = "Aviator registration and session API")]
struct Args {
    /// Port to listen on. Overrides the port of `BIND_ADDR` (0 = ephemeral).
    #[arg(long)]
    port: Option<u16>,

    /// PostgreSQL connection URL. Falls back to `DATABASE_URL`.
    #[arg(long)]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Keep identities and codes in process memory instead of PostgreSQL.
    #[arg(long, env = "AVIATOR_IN_MEMORY", default_value_t = false)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,aviator_api=debug,aviator_core=debug"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let args = Args::parse();

    // Missing JWT_SECRET aborts here, before anything binds.
    let mut config = aviator_api::config::ApiConfig::from_env()?;
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    if let Some(port) = args.port {
        let host = config
            .bind_addr
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "127.0.0.1".into());
        config.bind_addr = format!("{host}:{port}");
    }

    info!(?config, "starting aviator_api_server");

    let store: Arc<dyn CredentialStore> = if args.in_memory {
        warn!("using in-memory credential store, data is lost on exit");
        Arc::new(MemoryCredentialStore::new())
    } else {
        info!(max_connections = args.max_connections, "configuring connection pool");
        let pool = PgPoolOptions::new()
            .max_connections(args.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.database_url)
            .await?;

        info!("running database migrations");
        aviator_api::migrate(&pool).await?;
        Arc::new(PgCredentialStore::new(pool))
    };

    let mailer: Arc<dyn Mailer> = match config.mail.brevo_api_key.as_deref() {
        Some(key) => Arc::new(BrevoMailer::new(
            key,
            &config.mail.sender_email,
            Some(&config.mail.sender_name),
        )?),
        None => {
            warn!("BREVO_API_KEY not set, one-time codes will only be logged");
            Arc::new(LogMailer)
        }
    };

    let state = aviator_api::AppState::new(config.clone(), store, mailer)?;

    let window = config.check_email_window();
    state
        .rate_limiter
        .spawn_cleanup_task(window, window.max(Duration::from_secs(60)));

    let app = aviator_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
