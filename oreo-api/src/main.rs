// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  oreo-server — standalone authorization service
//
//  REST boundary: axum on tokio
//  Policy store:  etcd (JSON documents, TC_OREO_* collections)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::Parser;
use oreo_api::server::{self, AppState};
use oreo_auth::Oreo;
use oreo_core::config::OreoConfig;
use oreo_store::EtcdStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "oreo-server", version, about = "Oreo — API gateway authorization service")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Tracing ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "oreo-server starting");

    // ── Config ──
    let config = OreoConfig::load(cli.config.as_deref())?;
    info!(
        group = %config.group_name,
        singleton = config.singleton,
        "configuration loaded"
    );

    // ── Store ──
    let store = EtcdStore::connect(
        &config.etcd.endpoints,
        &config.etcd.prefix,
        Duration::from_millis(config.etcd.timeout_ms),
    )
    .await?;

    // ── Core ──
    let oreo = Arc::new(Oreo::new(&config, Arc::new(store)).await?);
    oreo.log_routes();

    // ── REST boundary ──
    let state = AppState { oreo: oreo.clone() };
    let result = server::start(&config.admin, state, "").await;

    oreo.stop();
    result
}
