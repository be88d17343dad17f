//! Flight booking application.
//!
//! Wires configuration, tracing and the `PostgreSQL` store into the three
//! core services. The binaries in `src/bin` are thin wrappers around [`App`]:
//!
//! - `wait-for-db` blocks until the configured database answers
//! - `demo` seeds a small catalog, books seats and prints the read models

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod seed;
pub mod telemetry;

pub use config::{Config, ConfigError, PostgresConfig};

use flight_booking_core::{
    BookingStore, CatalogService, Clock, OrderService, QueryService, SystemClock,
};
use flight_booking_postgres::{wait_for_database, DatabaseError, PostgresBookingStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while starting the application.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The database could not be reached or migrated.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for StartupError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database(DatabaseError::Sqlx(error))
    }
}

/// The booking services sharing one store.
pub struct App<S> {
    /// Shared store
    pub store: Arc<S>,
    /// Order placement
    pub orders: OrderService<S>,
    /// Reference data maintenance
    pub catalog: CatalogService<S>,
    /// Read models
    pub queries: QueryService<S>,
}

impl<S: BookingStore> App<S> {
    /// Build the services over `store`, stamping orders with `clock`.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            orders: OrderService::new(Arc::clone(&store), clock),
            catalog: CatalogService::new(Arc::clone(&store)),
            queries: QueryService::new(Arc::clone(&store)),
            store,
        }
    }
}

impl App<PostgresBookingStore> {
    /// Wait for the database, open a pool, apply migrations and build the
    /// services on the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::Database`] if the database stays unavailable
    /// or a migration fails.
    pub async fn connect(config: &Config) -> Result<Self, StartupError> {
        let postgres = &config.postgres;
        wait_for_database(
            &postgres.url,
            postgres.wait_attempts,
            postgres.wait_interval(),
        )
        .await?;

        let pool = PgPoolOptions::new()
            .max_connections(postgres.max_connections)
            .min_connections(postgres.min_connections)
            .acquire_timeout(postgres.connect_timeout())
            .connect(&postgres.url)
            .await?;
        tracing::info!(
            max_connections = postgres.max_connections,
            min_connections = postgres.min_connections,
            "Connection pool ready"
        );

        let store = PostgresBookingStore::new(pool);
        store.migrate().await?;

        Ok(Self::new(Arc::new(store), Arc::new(SystemClock)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use flight_booking_core::{FlightFilter, FlightId, Identity, TicketRequest, UserId};

    #[test]
    fn test_config_error_is_startup_error() {
        let err = Config::from_lookup(|key| {
            (key == "DATABASE_WAIT_ATTEMPTS").then(|| "-1".to_string())
        })
        .map_err(StartupError::from)
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid value \"-1\" for DATABASE_WAIT_ATTEMPTS"
        );
    }

    #[tokio::test]
    async fn test_services_reject_anonymous_callers() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        let app = App::new(
            Arc::new(PostgresBookingStore::new(pool)),
            Arc::new(SystemClock),
        );

        let flights = app.queries.list_flights(None, &FlightFilter::default()).await;
        assert!(flights.is_err());

        let anonymous = app
            .orders
            .create_order(None, vec![TicketRequest::new(FlightId::new(1), 1, 1)])
            .await;
        assert!(anonymous.is_err());

        let customer = Identity::customer(UserId::new(1));
        let forbidden = app.catalog.create_country(Some(&customer), "Ukraine").await;
        assert!(forbidden.is_err());
    }
}
