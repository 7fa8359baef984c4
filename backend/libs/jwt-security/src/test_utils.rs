//! Redis connection helpers for ledger tests

use anyhow::Result;
use redis::aio::ConnectionManager;
use redis::Client;
use std::env;

/// Uses REDIS_TEST_URL or defaults to localhost. Callers skip when this fails.
pub async fn get_test_redis_connection() -> Result<ConnectionManager> {
    let redis_url =
        env::var("REDIS_TEST_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

    let client = Client::open(redis_url)
        .map_err(|e| anyhow::anyhow!("Failed to create Redis client: {}", e))?;

    let manager = tokio::time::timeout(
        std::time::Duration::from_secs(2),
        ConnectionManager::new(client),
    )
    .await
    .map_err(|_| anyhow::anyhow!("Timed out connecting to Redis"))?
    .map_err(|e| anyhow::anyhow!("Failed to connect to Redis: {}", e))?;

    Ok(manager)
}
