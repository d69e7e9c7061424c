use clap::Parser;
use sift::cli::{self, Cli};
use sift_core::{config::Config, JsonFileStore, SearchRepository};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/sift-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("sift debug log started, tail -f /tmp/sift-debug.log");
    }

    let config = Config::load()?;
    let store_path = cli.store.clone().unwrap_or_else(|| config.storage.store_path());
    tracing::debug!(path = %store_path.display(), "using store");

    let repo = SearchRepository::new(Arc::new(JsonFileStore::new(store_path)));
    let today = chrono::Utc::now().date_naive();
    let output = cli::execute(cli.command, &repo, today, cli.json || config.output.json).await?;

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
