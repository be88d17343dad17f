//! Block until the configured database accepts connections.
//!
//! Exits non-zero once `DATABASE_WAIT_ATTEMPTS` attempts have failed.

use flight_booking::{telemetry, Config};
use flight_booking_postgres::wait_for_database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    telemetry::init(&config.log_filter);

    tracing::info!(
        attempts = config.postgres.wait_attempts,
        interval_ms = config.postgres.wait_interval_ms,
        "Waiting for database"
    );
    wait_for_database(
        &config.postgres.url,
        config.postgres.wait_attempts,
        config.postgres.wait_interval(),
    )
    .await?;

    Ok(())
}
