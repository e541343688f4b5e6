use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ticketflow::app::{self, Cli};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "starting");

    app::run(cli).await
}
