//! Interactive console for a remote task service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use console::ConsolePresenter;
use tasksync_app::{Client, ClientConfig};
use tasksync_core::CsrfHeader;
use tasksync_store_http::HttpStore;

mod console;

/// Keeps a local task list in sync with a remote task service.
#[derive(Parser, Debug)]
#[command(
    name = "tasksync",
    version,
    about = "tasksync: console client for a CSRF-protected task service"
)]
struct Cli {
    /// Configuration file (defaults to the user config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// API base URL, overriding the configuration file and TASKSYNC_API_URL.
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> Result<()> {
    let Cli { config, api_url } = Cli::parse();
    install_tracing();

    let config = ClientConfig::resolve(config.as_deref(), api_url.as_deref())?;
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?
        .block_on(run(config))
}

async fn run(config: ClientConfig) -> Result<()> {
    let header = CsrfHeader::new();
    let store = HttpStore::new(&config.api_url, config.timeout(), header.clone())?;
    info!(api_url = %store.base_url(), "connecting");

    let presenter = Arc::new(ConsolePresenter::default());
    let client = Client::new(Arc::new(store), Arc::clone(&presenter), header);
    if let Err(err) = client.prime().await {
        warn!(%err, "could not fetch csrf token; the first rejected request will retry");
    }

    let input = BufReader::new(tokio::io::stdin());
    let mut output = std::io::stdout().lock();
    console::run(&client, &presenter, input, &mut output).await
}

fn install_tracing() {
    // Logs go to stderr so the console stays readable.
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref()))
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// `RUST_LOG` directives when given, INFO otherwise.
fn env_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}
