//! Persistence traits.
//!
//! The order flow, catalog and query layer never talk to a database directly;
//! they are generic over these traits so tests can swap in the in-memory store
//! from `flight-booking-testing`.
//!
//! # Implementations
//!
//! - `PostgresBookingStore` (in `flight-booking-postgres`): production storage
//! - `InMemoryBookingStore` (in `flight-booking-testing`): fast, deterministic tests
//!
//! Methods return `impl Future + Send` so generic callers can be spawned.

use crate::error::Result;
use crate::filter::{CrewFilter, FlightFilter, TicketFilter};
use crate::identity::OrderScope;
use crate::types::{
    Airplane, AirplaneType, Airport, City, CityId, Country, CountryId, Crew,
    EntityRef, Flight, FlightId, NewAirplane, NewCrew, NewFlight, NewRoute, Order, OrderId,
    Position, Route, SeatGrid, SeatPosition, Ticket, TicketRequest, UserId,
};
use crate::views::{
    AirplaneListing, AirportListing, CityListing, CrewListing, FlightSnapshot, OrderListing,
    RouteListing, TicketListing,
};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Opens transactions for the order flow.
pub trait UnitOfWork: Send + Sync {
    /// Transaction handle type.
    type Transaction: BookingTransaction;

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BookingError::Storage`] if no transaction can be opened.
    fn begin(&self) -> impl Future<Output = Result<Self::Transaction>> + Send;
}

/// An open transaction over the ticket set.
///
/// Nothing written through the handle is visible to other readers until
/// [`commit`](Self::commit). Dropping the handle without committing discards
/// every write.
pub trait BookingTransaction: Send + Sized {
    /// Lock a flight for the rest of the transaction and return its seat grid.
    ///
    /// Concurrent transactions that lock the same flight are serialised.
    /// Returns `None` if the flight does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BookingError::Storage`] if the query fails.
    fn lock_flight(&mut self, flight: FlightId)
    -> impl Future<Output = Result<Option<SeatGrid>>> + Send;

    /// Whether a ticket already occupies `seat` on `flight`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BookingError::Storage`] if the query fails.
    fn is_seat_taken(
        &mut self,
        flight: FlightId,
        seat: SeatPosition,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Insert an order owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BookingError::Storage`] if the insert fails.
    fn insert_order(
        &mut self,
        user: UserId,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Order>> + Send;

    /// Insert a ticket bound to `order`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BookingError::SeatTaken`] if the unique (flight, row,
    /// seat) constraint rejects the row, [`crate::BookingError::Storage`] for
    /// other failures.
    fn insert_ticket(
        &mut self,
        order: OrderId,
        request: TicketRequest,
    ) -> impl Future<Output = Result<Ticket>> + Send;

    /// Publish every write made through this handle.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BookingError::Storage`] if the commit fails. Seat
    /// uniqueness is checked immediately, so conflicts surface from
    /// [`insert_ticket`](Self::insert_ticket) and never here.
    fn commit(self) -> impl Future<Output = Result<()>> + Send;

    /// Discard every write made through this handle.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BookingError::Storage`] if the rollback fails.
    fn rollback(self) -> impl Future<Output = Result<()>> + Send;
}

/// Writes to the reference data.
///
/// Implementations enforce uniqueness (`Duplicate`), referential integrity on
/// insert (`NotFound`) and protect-on-delete (`Protected`). Input validation
/// happens before these are called.
pub trait CatalogStore: Send + Sync {
    /// Create a country.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the name is taken.
    fn create_country(&self, name: &str) -> impl Future<Output = Result<Country>> + Send;

    /// Create a city.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the name is taken, `NotFound` for an unknown country.
    fn create_city(
        &self,
        name: &str,
        country: CountryId,
    ) -> impl Future<Output = Result<City>> + Send;

    /// Create an airport.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the name is taken, `NotFound` for an unknown city.
    fn create_airport(&self, name: &str, city: CityId)
    -> impl Future<Output = Result<Airport>> + Send;

    /// Create a route.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the (source, destination) pair exists, `NotFound`
    /// for an unknown airport.
    fn create_route(&self, route: &NewRoute) -> impl Future<Output = Result<Route>> + Send;

    /// Create an airplane type.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the name is taken.
    fn create_airplane_type(&self, name: &str)
    -> impl Future<Output = Result<AirplaneType>> + Send;

    /// Create an airplane.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the name is taken, `NotFound` for an unknown type.
    fn create_airplane(
        &self,
        airplane: &NewAirplane,
    ) -> impl Future<Output = Result<Airplane>> + Send;

    /// Create a crew position.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the name is taken.
    fn create_position(&self, name: &str) -> impl Future<Output = Result<Position>> + Send;

    /// Create a crew member.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown position.
    fn create_crew(&self, crew: &NewCrew) -> impl Future<Output = Result<Crew>> + Send;

    /// Create a flight.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown route, airplane or crew member.
    fn create_flight(&self, flight: &NewFlight) -> impl Future<Output = Result<Flight>> + Send;

    /// Delete an entity, honouring protect, cascade and set-null rules.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist, `Protected` if it is referenced.
    fn delete(&self, target: EntityRef) -> impl Future<Output = Result<()>> + Send;
}

/// Read access. Results are ordered by ascending id.
pub trait BookingQueries: Send + Sync {
    /// Flights passing `filter`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    fn flights(
        &self,
        filter: &FlightFilter,
    ) -> impl Future<Output = Result<Vec<FlightSnapshot>>> + Send;

    /// One flight, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    fn flight(&self, id: FlightId) -> impl Future<Output = Result<Option<FlightSnapshot>>> + Send;

    /// All countries.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    fn countries(&self) -> impl Future<Output = Result<Vec<Country>>> + Send;

    /// All cities.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    fn cities(&self) -> impl Future<Output = Result<Vec<CityListing>>> + Send;

    /// All airports.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    fn airports(&self) -> impl Future<Output = Result<Vec<AirportListing>>> + Send;

    /// All airplane types.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    fn airplane_types(&self) -> impl Future<Output = Result<Vec<AirplaneType>>> + Send;

    /// All crew positions.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    fn positions(&self) -> impl Future<Output = Result<Vec<Position>>> + Send;

    /// All routes.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    fn routes(&self) -> impl Future<Output = Result<Vec<RouteListing>>> + Send;

    /// All airplanes.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    fn airplanes(&self) -> impl Future<Output = Result<Vec<AirplaneListing>>> + Send;

    /// Crew passing `filter`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    fn crews(&self, filter: &CrewFilter) -> impl Future<Output = Result<Vec<CrewListing>>> + Send;

    /// Tickets passing `filter`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    fn tickets(
        &self,
        filter: &TicketFilter,
    ) -> impl Future<Output = Result<Vec<TicketListing>>> + Send;

    /// Orders visible in `scope`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    fn orders(&self, scope: OrderScope) -> impl Future<Output = Result<Vec<OrderListing>>> + Send;
}

/// Convenience: a store that does everything.
pub trait BookingStore: UnitOfWork + CatalogStore + BookingQueries {}

impl<T> BookingStore for T where T: UnitOfWork + CatalogStore + BookingQueries {}
