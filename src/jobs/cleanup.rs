use sqlx::MySqlPool;
use std::time::Duration;
use tracing::{error, info};

/// Hourly purge of revoked and expired refresh tokens.
pub async fn purge_refresh_tokens(pool: MySqlPool) {
    let mut interval = tokio::time::interval(Duration::from_secs(3600));

    loop {
        interval.tick().await;

        match sqlx::query("DELETE FROM refresh_tokens WHERE revoked = TRUE OR expires_at < NOW()")
            .execute(&pool)
            .await
        {
            Ok(res) if res.rows_affected() > 0 => {
                info!(purged = res.rows_affected(), "purged dead refresh tokens");
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "refresh token purge failed"),
        }
    }
}

/// Daily purge of messages older than the retention window.
pub async fn purge_old_messages(pool: MySqlPool, retention_days: u32) {
    let mut interval = tokio::time::interval(Duration::from_secs(86_400));

    loop {
        interval.tick().await;

        match sqlx::query("DELETE FROM messages WHERE created_at < NOW() - INTERVAL ? DAY")
            .bind(retention_days)
            .execute(&pool)
            .await
        {
            Ok(res) if res.rows_affected() > 0 => {
                info!(purged = res.rows_affected(), "purged expired messages");
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "message purge failed"),
        }
    }
}
