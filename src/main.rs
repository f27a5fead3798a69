use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use blogsmith::{build_state, config::Config, create_router, utils::init_logger};

#[derive(Parser, Debug)]
#[command(name = "blogsmith", version, about = "Blog generation and support chat API")]
struct Args {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding agents.yaml and tasks.yaml (overrides AGENTS_CONFIG_DIR)
    #[arg(long)]
    agents_config_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger();

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.agents_config_dir {
        config.pipeline.config_dir = dir;
    }
    info!("Configuration loaded: {:?}", config.server);

    // Create shared state
    let state = build_state(&config).await;

    // Create router
    let app = create_router(state, &config)
        .map_err(|e| anyhow::anyhow!("Invalid ALLOWED_ORIGIN '{}': {}", config.server.allowed_origin, e))?;

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
