//! Domain types for flight booking.
//!
//! Identifiers, reference entities (countries through airplanes), flights,
//! tickets and orders, plus the creation inputs the catalog accepts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database identifier
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the raw database identifier
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a country
    CountryId
);
entity_id!(
    /// Unique identifier for a city
    CityId
);
entity_id!(
    /// Unique identifier for an airport
    AirportId
);
entity_id!(
    /// Unique identifier for a route
    RouteId
);
entity_id!(
    /// Unique identifier for an airplane type
    AirplaneTypeId
);
entity_id!(
    /// Unique identifier for an airplane
    AirplaneId
);
entity_id!(
    /// Unique identifier for a crew position
    PositionId
);
entity_id!(
    /// Unique identifier for a crew member
    CrewId
);
entity_id!(
    /// Unique identifier for a flight
    FlightId
);
entity_id!(
    /// Unique identifier for a ticket
    TicketId
);
entity_id!(
    /// Unique identifier for an order
    OrderId
);
entity_id!(
    /// Identifier of an authenticated user, issued by the identity provider
    UserId
);

/// Kind of entity, used to attribute lookups and constraint failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// [`Country`]
    Country,
    /// [`City`]
    City,
    /// [`Airport`]
    Airport,
    /// [`Route`]
    Route,
    /// [`AirplaneType`]
    AirplaneType,
    /// [`Airplane`]
    Airplane,
    /// [`Position`]
    Position,
    /// [`Crew`]
    Crew,
    /// [`Flight`]
    Flight,
    /// [`Ticket`]
    Ticket,
    /// [`Order`]
    Order,
}

impl EntityKind {
    /// Lowercase name used in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::City => "city",
            Self::Airport => "airport",
            Self::Route => "route",
            Self::AirplaneType => "airplane type",
            Self::Airplane => "airplane",
            Self::Position => "position",
            Self::Crew => "crew",
            Self::Flight => "flight",
            Self::Ticket => "ticket",
            Self::Order => "order",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to any stored entity, used for deletion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// A country
    Country(CountryId),
    /// A city
    City(CityId),
    /// An airport
    Airport(AirportId),
    /// A route
    Route(RouteId),
    /// An airplane type
    AirplaneType(AirplaneTypeId),
    /// An airplane
    Airplane(AirplaneId),
    /// A crew position
    Position(PositionId),
    /// A crew member
    Crew(CrewId),
    /// A flight
    Flight(FlightId),
    /// A ticket
    Ticket(TicketId),
    /// An order
    Order(OrderId),
}

impl EntityRef {
    /// Kind and raw id of the referenced entity.
    #[must_use]
    pub const fn parts(&self) -> (EntityKind, i64) {
        match *self {
            Self::Country(id) => (EntityKind::Country, id.get()),
            Self::City(id) => (EntityKind::City, id.get()),
            Self::Airport(id) => (EntityKind::Airport, id.get()),
            Self::Route(id) => (EntityKind::Route, id.get()),
            Self::AirplaneType(id) => (EntityKind::AirplaneType, id.get()),
            Self::Airplane(id) => (EntityKind::Airplane, id.get()),
            Self::Position(id) => (EntityKind::Position, id.get()),
            Self::Crew(id) => (EntityKind::Crew, id.get()),
            Self::Flight(id) => (EntityKind::Flight, id.get()),
            Self::Ticket(id) => (EntityKind::Ticket, id.get()),
            Self::Order(id) => (EntityKind::Order, id.get()),
        }
    }
}

// ============================================================================
// Reference entities
// ============================================================================

/// A country
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Country ID
    pub id: CountryId,
    /// Unique name
    pub name: String,
}

/// A city within a country
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// City ID
    pub id: CityId,
    /// Unique name
    pub name: String,
    /// Country the city belongs to
    pub country: CountryId,
}

/// An airport serving a city
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    /// Airport ID
    pub id: AirportId,
    /// Unique name
    pub name: String,
    /// City the airport serves
    pub city: CityId,
}

/// A directed route between two airports
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Route ID
    pub id: RouteId,
    /// Departure airport
    pub source: AirportId,
    /// Arrival airport
    pub destination: AirportId,
    /// Distance in kilometres
    pub distance: i32,
}

/// A model of airplane
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirplaneType {
    /// Airplane type ID
    pub id: AirplaneTypeId,
    /// Unique name
    pub name: String,
}

/// An airplane and its seating grid
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airplane {
    /// Airplane ID
    pub id: AirplaneId,
    /// Unique name
    pub name: String,
    /// Number of seat rows
    pub rows: i32,
    /// Seats in each row
    pub seats_in_row: i32,
    /// Airplane type
    pub airplane_type: AirplaneTypeId,
}

impl Airplane {
    /// Seating grid of this airplane.
    #[must_use]
    pub const fn grid(&self) -> SeatGrid {
        SeatGrid::new(self.rows, self.seats_in_row)
    }
}

/// A crew position (pilot, purser, ...)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Position ID
    pub id: PositionId,
    /// Unique name
    pub name: String,
}

/// A crew member
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crew {
    /// Crew ID
    pub id: CrewId,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Position, cleared when the position is deleted
    pub position: Option<PositionId>,
}

/// A scheduled flight
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    /// Flight ID
    pub id: FlightId,
    /// Route flown
    pub route: RouteId,
    /// Airplane used
    pub airplane: AirplaneId,
    /// Departure time
    pub departure_time: DateTime<Utc>,
    /// Arrival time
    pub arrival_time: DateTime<Utc>,
    /// Assigned crew, ascending by id
    pub crews: Vec<CrewId>,
}

/// A sold seat on a flight
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket ID
    pub id: TicketId,
    /// Seat row (1-based)
    pub row: i32,
    /// Seat within the row (1-based)
    pub seat: i32,
    /// Flight the seat belongs to
    pub flight: FlightId,
    /// Order that owns the ticket
    pub order: OrderId,
}

impl Ticket {
    /// Seat occupied by this ticket.
    #[must_use]
    pub const fn position(&self) -> SeatPosition {
        SeatPosition::new(self.row, self.seat)
    }
}

/// A user's purchase of one or more tickets
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID
    pub id: OrderId,
    /// When the order was created
    #[serde(rename = "create_at")]
    pub created_at: DateTime<Utc>,
    /// Owner of the order
    pub user: UserId,
}

// ============================================================================
// Seating value objects
// ============================================================================

/// A (row, seat) coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatPosition {
    /// Row (1-based)
    pub row: i32,
    /// Seat within the row (1-based)
    pub seat: i32,
}

impl SeatPosition {
    /// Creates a new `SeatPosition`
    #[must_use]
    pub const fn new(row: i32, seat: i32) -> Self {
        Self { row, seat }
    }
}

/// The seat grid of an airplane: `rows × seats_in_row` coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatGrid {
    /// Number of rows
    pub rows: i32,
    /// Seats in each row
    pub seats_in_row: i32,
}

impl SeatGrid {
    /// Creates a new `SeatGrid`
    #[must_use]
    pub const fn new(rows: i32, seats_in_row: i32) -> Self {
        Self { rows, seats_in_row }
    }

    /// Total number of seats.
    #[must_use]
    pub fn capacity(&self) -> i64 {
        i64::from(self.rows) * i64::from(self.seats_in_row)
    }
}

// ============================================================================
// Order input
// ============================================================================

/// One requested seat inside an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRequest {
    /// Flight to book
    pub flight: FlightId,
    /// Requested row
    pub row: i32,
    /// Requested seat
    pub seat: i32,
}

impl TicketRequest {
    /// Creates a new `TicketRequest`
    #[must_use]
    pub const fn new(flight: FlightId, row: i32, seat: i32) -> Self {
        Self { flight, row, seat }
    }

    /// Requested seat coordinate.
    #[must_use]
    pub const fn position(&self) -> SeatPosition {
        SeatPosition::new(self.row, self.seat)
    }
}

/// An order and the tickets created with it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    /// The committed order
    #[serde(flatten)]
    pub order: Order,
    /// Tickets in request order
    pub tickets: Vec<Ticket>,
}

// ============================================================================
// Catalog input
// ============================================================================

/// Input for creating a route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoute {
    /// Departure airport
    pub source: AirportId,
    /// Arrival airport
    pub destination: AirportId,
    /// Distance in kilometres (must be positive)
    pub distance: i32,
}

/// Input for creating an airplane.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAirplane {
    /// Unique name
    pub name: String,
    /// Number of rows (at least 1)
    pub rows: i32,
    /// Seats per row (at least 1)
    pub seats_in_row: i32,
    /// Airplane type
    pub airplane_type: AirplaneTypeId,
}

/// Input for creating a crew member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCrew {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Optional position
    pub position: Option<PositionId>,
}

/// Input for creating a flight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFlight {
    /// Route flown
    pub route: RouteId,
    /// Airplane used
    pub airplane: AirplaneId,
    /// Departure time
    pub departure_time: DateTime<Utc>,
    /// Arrival time (must be after departure)
    pub arrival_time: DateTime<Utc>,
    /// Assigned crew
    pub crews: Vec<CrewId>,
}
