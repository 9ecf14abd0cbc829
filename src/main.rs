use clap::Parser;
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crm_api::config::AppConfig;
use crm_api::database::DatabaseManager;
use crm_api::{app, AppState};

#[derive(Parser, Debug)]
#[command(name = "crm-api")]
#[command(about = "CRM API server - clients, invoices, projects and tasks")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides CRM_API_PORT / PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides SERVER_BIND)")]
    bind: Option<String>,

    #[arg(long, help = "Apply the bundled database migrations before serving")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and friends
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    info!("Starting CRM API in {:?} mode", config.environment);
    if config.is_production() && !config.security.cookie_secure {
        warn!("Session cookies are not marked Secure in production");
    }

    let bind_addr = format!("{}:{}", config.server.bind_addr, config.server.port);
    let state = AppState::new(config)?;

    if args.migrate {
        DatabaseManager::migrate(&state.db).await?;
    }
    state.spawn_maintenance();

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("CRM API listening on http://{}", bind_addr);

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
