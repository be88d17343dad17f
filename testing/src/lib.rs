//! # Flight Booking Testing
//!
//! Testing utilities for the flight booking crates.
//!
//! This crate provides:
//! - Mock implementations of environment traits ([`FixedClock`])
//! - [`InMemoryBookingStore`], implementing every storage trait
//! - [`Fixtures`] for building catalog data through any store
//! - proptest strategies for seat coordinates
//!
//! ## Example
//!
//! ```ignore
//! use flight_booking_testing::{test_clock, Fixtures, InMemoryBookingStore};
//!
//! #[tokio::test]
//! async fn test_order_flow() {
//!     let store = Arc::new(InMemoryBookingStore::new());
//!     let fixtures = Fixtures::new(Arc::clone(&store));
//!     let flight = fixtures.sample_flight().await.unwrap();
//!
//!     let orders = OrderService::new(store, Arc::new(test_clock()));
//!     let placed = orders
//!         .create_order(Some(&customer()), vec![TicketRequest::new(flight.id, 1, 1)])
//!         .await
//!         .unwrap();
//!     assert_eq!(placed.tickets.len(), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use flight_booking_core::environment::Clock;

pub mod fixtures;
pub mod memory;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use flight_booking_core::{Identity, UserId};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use flight_booking_testing::mocks::FixedClock;
    /// use flight_booking_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// A non-staff identity (user 1).
    #[must_use]
    pub const fn customer() -> Identity {
        Identity::customer(UserId::new(1))
    }

    /// A staff identity (user 100).
    #[must_use]
    pub const fn staff() -> Identity {
        Identity::staff(UserId::new(100))
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use flight_booking_core::{SeatGrid, SeatPosition};
    use proptest::prelude::*;

    /// Seats inside `grid`.
    pub fn seat_within(grid: SeatGrid) -> impl Strategy<Value = SeatPosition> {
        (1..=grid.rows, 1..=grid.seats_in_row).prop_map(|(row, seat)| SeatPosition::new(row, seat))
    }

    /// Seats with at least one coordinate outside `grid`.
    pub fn seat_outside(grid: SeatGrid) -> impl Strategy<Value = SeatPosition> {
        prop_oneof![
            (1..=grid.rows, grid.seats_in_row + 1..=grid.seats_in_row + 50)
                .prop_map(|(row, seat)| SeatPosition::new(row, seat)),
            (grid.rows + 1..=grid.rows + 50, 1..=grid.seats_in_row)
                .prop_map(|(row, seat)| SeatPosition::new(row, seat)),
            (-5i32..=0, -5i32..=0).prop_map(|(row, seat)| SeatPosition::new(row, seat)),
        ]
    }
}

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call has an effect.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use fixtures::{Fixtures, Place, BERLIN, KYIV, LONDON, WARSAW};
pub use memory::{InMemoryBookingStore, InMemoryTransaction};
pub use mocks::{customer, staff, test_clock, FixedClock};
