//! Billing daemon - initializes storage and runs the recurring scheduler.

use dotenvy::dotenv;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tuition_billing::{config, errors::Result, scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load application settings (billing.toml, defaults if absent)
    let settings = config::settings::load_default_config()?;
    info!(
        scan_interval_secs = settings.scan_interval_secs,
        "Loaded application settings."
    );

    // 4. Initialize database
    let db = config::database::create_connection().await?;
    config::database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Run the billing scheduler; ticks once now, then on the interval
    scheduler::run(db, Duration::from_secs(settings.scan_interval_secs)).await;

    Ok(())
}
