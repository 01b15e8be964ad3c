use pg_sweeper::{Config, Error, Result, StaleConnectionCleaner, StartupHook};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    setup_tracing();

    let config = Config::from_env();
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        return Err(Error::Config(e));
    }

    let cleaner = StaleConnectionCleaner::new(&config.database_url, config.policy.clone())?;

    // Ctrl+C aborts the outstanding sweep
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    // One-shot: the hook swallows cleanup failures by contract, so the
    // process exits cleanly either way. Schedule reruns externally if
    // periodic sweeping is wanted.
    StartupHook::new(cleaner).on_start(shutdown_rx).await;

    Ok(())
}

fn setup_tracing() {
    // Honor RUST_LOG when set, default to "info" otherwise
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
