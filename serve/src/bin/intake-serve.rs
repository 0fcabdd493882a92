//! Process entry point: loads config, initializes logging, runs the HTTP server.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // `.env` / XDG `~/.config/intake/config.toml` fill in any `APP_*`, `MCP_*`, or
    // `AZURE_AI_*` variable not already set in the real environment.
    let _ = intake_config::load_and_apply("intake", None);

    let log_level = std::env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(filter))
        .init();

    let addr = std::env::var("APP_BIND_ADDR").ok();
    serve::run_serve(addr.as_deref()).await
}
