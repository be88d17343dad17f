//! Startup readiness check.

use crate::DatabaseError;
use sqlx::{Connection, PgConnection};
use std::time::Duration;

/// Block until the database at `url` answers `SELECT 1`.
///
/// Tries up to `attempts` times (at least once), sleeping `interval` between
/// attempts.
///
/// # Errors
///
/// Returns [`DatabaseError::Unavailable`] with the last connection error when
/// every attempt fails.
pub async fn wait_for_database(
    url: &str,
    attempts: u32,
    interval: Duration,
) -> Result<(), DatabaseError> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match ping(url).await {
            Ok(()) => {
                tracing::info!(attempt, "Database available");
                return Ok(());
            }
            Err(source) if attempt >= attempts => {
                return Err(DatabaseError::Unavailable { attempts, source });
            }
            Err(e) => {
                tracing::warn!(attempt, attempts, error = %e, "Database unavailable, waiting");
                tokio::time::sleep(interval).await;
                attempt += 1;
            }
        }
    }
}

async fn ping(url: &str) -> Result<(), sqlx::Error> {
    let mut conn = PgConnection::connect(url).await?;
    sqlx::query("SELECT 1").execute(&mut conn).await?;
    conn.close().await
}
