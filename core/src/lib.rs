//! # Flight Booking Core
//!
//! Domain types and rules for an airline booking backend.
//!
//! ## Core Concepts
//!
//! - **Catalog**: countries, cities, airports, routes, airplanes, crew, flights
//! - **Order**: a user's purchase of one or more tickets, created atomically
//! - **Ticket**: one sold `(row, seat)` on a flight, unique per flight
//! - **Availability**: capacity minus sold tickets, computed on every read
//!
//! ## Architecture
//!
//! Services ([`OrderService`], [`CatalogService`], [`QueryService`]) hold the
//! rules and are generic over the storage traits in [`store`]. Storage
//! adapters live in separate crates (`flight-booking-postgres` for production,
//! `flight-booking-testing` for tests). Time is injected through
//! [`environment::Clock`].
//!
//! ## Example
//!
//! ```ignore
//! use flight_booking_core::*;
//!
//! let orders = OrderService::new(store.clone(), Arc::new(SystemClock));
//! let placed = orders
//!     .create_order(
//!         Some(&Identity::customer(UserId::new(1))),
//!         vec![TicketRequest::new(FlightId::new(1), 1, 1)],
//!     )
//!     .await?;
//! ```

pub mod availability;
pub mod catalog;
pub mod derived;
pub mod environment;
pub mod error;
pub mod filter;
pub mod identity;
pub mod order;
pub mod query;
pub mod store;
pub mod types;
pub mod validator;
pub mod views;

pub use availability::{Availability, TakenSeats};
pub use catalog::CatalogService;
pub use environment::{Clock, SystemClock};
pub use error::{BookingError, Result, SeatField};
pub use filter::{CrewFilter, FlightFilter, TicketFilter};
pub use identity::{Identity, OrderScope};
pub use order::{OrderService, OrderStage};
pub use query::QueryService;
pub use store::{BookingQueries, BookingStore, BookingTransaction, CatalogStore, UnitOfWork};
pub use types::*;
pub use validator::TicketValidator;
pub use views::{
    AirplaneListing, AirportListing, CityListing, CrewListing, FlightDetail, FlightListing,
    FlightSnapshot, OrderListing, RouteListing, TicketListing,
};
