use crate::schemas::AppState;
use anyhow::Result;
use moka::future::Cache;
use sea_orm::Database;
use std::time::Duration;

/// Summaries change with every settlement; keep them only briefly.
const SUMMARY_CACHE_TTL: Duration = Duration::from_secs(60);

/// Initialize application state against the given database URL
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    let summary_cache = Cache::builder()
        .max_capacity(1_000)
        .time_to_live(SUMMARY_CACHE_TTL)
        .build();

    Ok(AppState { db, summary_cache })
}
