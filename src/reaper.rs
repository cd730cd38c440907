//! Expiry reaper: removes unpaid draft bookings past their deadline.
//!
//! The backing store has no declarative row TTL, so this is an idempotent
//! sweep; the read paths already filter expired drafts out, so the sweep
//! only reclaims storage and frees the unique index entries.

use std::time::Duration;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use slotwise_api::config::ApiConfig;
use slotwise_db::create_pool;
use slotwise_db::repositories::booking::delete_expired_drafts;
use tracing::{error, info};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = ApiConfig::from_env()?;

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let db_pool = create_pool(&config.database_url).await?;
    info!("Expiry reaper started, sweeping every {:?}", SWEEP_INTERVAL);

    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        ticker.tick().await;
        if let Err(e) = delete_expired_drafts(&db_pool).await {
            error!("Expiry sweep failed: {}", e);
        }
    }
}
