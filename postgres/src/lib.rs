//! `PostgreSQL` storage for flight booking.
//!
//! This crate implements every storage trait from `flight-booking-core` on a
//! `sqlx` connection pool:
//!
//! - [`UnitOfWork`](flight_booking_core::UnitOfWork): order transactions that
//!   lock flight rows with `SELECT … FOR UPDATE`
//! - [`CatalogStore`](flight_booking_core::CatalogStore): reference data with
//!   unique, foreign-key and check constraints
//! - [`BookingQueries`](flight_booking_core::BookingQueries): joined read
//!   models with optional filters
//!
//! The schema lives in `migrations/` and is embedded at compile time.
//!
//! # Example
//!
//! ```no_run
//! use flight_booking_postgres::PostgresBookingStore;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgres://localhost/booking").await?;
//! let store = PostgresBookingStore::new(pool);
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
pub mod error;
mod queries;
mod rows;
mod transaction;
mod wait;

pub use error::DatabaseError;
pub use transaction::PostgresTransaction;
pub use wait::wait_for_database;

use sqlx::PgPool;

/// PostgreSQL-backed booking store.
///
/// Cheap to clone; clones share the pool.
#[derive(Clone, Debug)]
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Migration`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}
