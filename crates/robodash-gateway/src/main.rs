use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use robodash_client::DashboardClient;
use robodash_gateway::{
    api::{self, AppState},
    config::{load_users, GatewayConfig},
    db::SurrealStore,
    store::{MemoryStore, Store},
};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "robodash-gateway", version, about = "HTTP gateway for the delivery-robot dashboard")]
struct Cli {
    /// Where the HTTP API will listen, e.g. 127.0.0.1:8080
    #[arg(long, env = "ROBODASH_LISTEN", default_value = "127.0.0.1:8080")]
    listen: String,

    /// SurrealKV directory for status and acknowledgements.
    #[arg(long, env = "ROBODASH_DB_DIR", default_value = ".robodash/db")]
    db_dir: PathBuf,

    /// Keep state in memory only (lost on restart).
    #[arg(long, default_value_t = false)]
    memory: bool,

    /// Backend retrieval endpoint (`?message=...&userId=...`).
    #[arg(long, env = "ROBODASH_RETRIEVE_URL", default_value = "http://127.0.0.1:9000/retrieve")]
    retrieve_url: String,

    /// Classification service.
    #[arg(long, env = "ROBODASH_CLASSIFY_URL", default_value = "http://127.0.0.1:5000/classify")]
    classify_url: String,

    #[arg(long, default_value_t = 8)]
    classify_timeout_seconds: u64,

    /// JSON list of `{username, email}` served by /api/getUsers.
    #[arg(long, env = "ROBODASH_USERS_FILE")]
    users_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = GatewayConfig {
        listen: cli.listen,
        db_dir: (!cli.memory).then_some(cli.db_dir),
        retrieve_url: cli.retrieve_url,
        classify_url: cli.classify_url,
        classify_timeout: Duration::from_secs(cli.classify_timeout_seconds),
        users_file: cli.users_file,
    };
    info!("starting gateway with config: {:?}", config);

    let store: Arc<dyn Store> = match &config.db_dir {
        Some(dir) => Arc::new(SurrealStore::connect(dir).await?),
        None => Arc::new(MemoryStore::new()),
    };
    let users = config.users_file.as_deref().map(load_users).transpose()?;
    let upstream = DashboardClient::new(&config.upstream());

    let app = api::router(AppState::new(store, upstream, users));

    let addr: SocketAddr = config
        .listen
        .parse()
        .with_context(|| format!("invalid listen address {}", config.listen))?;
    info!("listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}
