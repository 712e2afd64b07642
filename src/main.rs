use reqwest::Client;
use sheetsync::sync::{self, SyncConfig, SyncError};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) run, then map failure to a fixed diagnostic + exit 1 ────
    match fetch_data_set().await {
        Ok(()) => {
            info!("all sheets written");
            std::process::exit(0);
        }
        Err(err) => {
            if let Some(cause) = err.cause() {
                error!(cause = %cause, "sync failed");
            }
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

async fn fetch_data_set() -> Result<(), SyncError> {
    let cfg = SyncConfig::from_env()?;
    let client = Client::new();
    sync::run(&client, &cfg).await
}
