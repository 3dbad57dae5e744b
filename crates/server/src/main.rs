use clap::Parser;
use fleetview_server::config::{Cli, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("fleetview_server=info,fleetview_engine=info,tower_http=info")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let cfg = ServerConfig::resolve(&cli)?;
    tracing::info!(addr = %cfg.addr, demo = cfg.demo, "starting fleetview on http://{}", cfg.addr);
    fleetview_server::serve(cfg).await
}
