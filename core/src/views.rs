//! Read models returned by the query layer.
//!
//! Stores produce the raw shapes ([`FlightSnapshot`], listings); flight
//! listings and details are derived here so both adapters agree on them.

use crate::availability::{taken_seats, Availability, TakenSeats};
use crate::derived::{flight_duration, route_description};
use crate::types::{
    AirplaneId, AirportId, CityId, CrewId, Flight, FlightId, OrderId, RouteId, SeatGrid,
    SeatPosition, TicketId, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A city with its country resolved to a name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityListing {
    /// City ID
    pub id: CityId,
    /// City name
    pub name: String,
    /// Country name
    pub country: String,
}

/// An airport with its city and country resolved to names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportListing {
    /// Airport ID
    pub id: AirportId,
    /// Airport name
    pub name: String,
    /// Country name
    pub country: String,
    /// City name
    pub city: String,
}

/// A route with its endpoints resolved to names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteListing {
    /// Route ID
    pub id: RouteId,
    /// Source airport name
    pub departure_airport: String,
    /// Destination airport name
    pub arrival_airport: String,
    /// Source country name
    pub departure_country: String,
    /// Source city name
    pub departure_city: String,
    /// Destination country name
    pub arrival_country: String,
    /// Destination city name
    pub arrival_city: String,
    /// Distance in kilometres
    pub distance: i32,
}

impl RouteListing {
    /// `"{source} -> {destination}. Distance {d}km"`
    #[must_use]
    pub fn description(&self) -> String {
        route_description(&self.departure_airport, &self.arrival_airport, self.distance)
    }
}

/// An airplane with its type resolved to a name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirplaneListing {
    /// Airplane ID
    pub id: AirplaneId,
    /// Airplane name
    pub name: String,
    /// Number of rows
    pub rows: i32,
    /// Seats per row
    pub seats_in_row: i32,
    /// Airplane type name
    pub airplane_type: String,
}

impl AirplaneListing {
    /// Seating grid of this airplane.
    #[must_use]
    pub const fn grid(&self) -> SeatGrid {
        SeatGrid::new(self.rows, self.seats_in_row)
    }
}

/// A crew member with the position resolved to a name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewListing {
    /// Crew ID
    pub id: CrewId,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Position name, if any
    pub position: Option<String>,
}

/// A ticket with its route endpoints resolved to airport names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketListing {
    /// Ticket ID
    pub id: TicketId,
    /// Row
    pub row: i32,
    /// Seat
    pub seat: i32,
    /// Flight
    pub flight: FlightId,
    /// Source airport name
    pub source: String,
    /// Destination airport name
    pub destination: String,
    /// Owning order
    pub order: OrderId,
}

/// An order with its tickets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderListing {
    /// Order ID
    pub id: OrderId,
    /// When the order was created
    #[serde(rename = "create_at")]
    pub created_at: DateTime<Utc>,
    /// Owner
    #[serde(skip_serializing)]
    pub user: UserId,
    /// Tickets, ascending by id
    pub tickets: Vec<TicketListing>,
}

/// Everything known about one flight at read time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlightSnapshot {
    /// The flight itself
    pub flight: Flight,
    /// Its route
    pub route: RouteListing,
    /// Its airplane
    pub airplane: AirplaneListing,
    /// Assigned crew, ascending by id
    pub crews: Vec<CrewListing>,
    /// Sold seats
    pub seats: Vec<SeatPosition>,
}

impl FlightSnapshot {
    /// Seat accounting for this flight.
    #[must_use]
    pub fn availability(&self) -> Availability {
        Availability::compute(self.airplane.grid(), &self.seats, &self.flight.crews)
    }

    /// Sold seats grouped by row.
    #[must_use]
    pub fn taken_seats(&self) -> TakenSeats {
        taken_seats(&self.seats)
    }

    /// Flight duration string.
    #[must_use]
    pub fn duration(&self) -> String {
        flight_duration(self.flight.departure_time, self.flight.arrival_time)
    }

    /// Summary shape used in flight lists.
    #[must_use]
    pub fn into_listing(self) -> FlightListing {
        let availability = self.availability();
        let duration = self.duration();
        FlightListing {
            id: self.flight.id,
            departure_time: self.flight.departure_time,
            arrival_time: self.flight.arrival_time,
            route: self.route,
            duration,
            crew_count: availability.crew_count,
            airplane: self.airplane,
            tickets_available: availability.tickets_available,
        }
    }

    /// Full shape used when a single flight is retrieved.
    #[must_use]
    pub fn into_detail(self) -> FlightDetail {
        let taken_seats = self.taken_seats();
        let duration = self.duration();
        FlightDetail {
            id: self.flight.id,
            departure_time: self.flight.departure_time,
            arrival_time: self.flight.arrival_time,
            route: self.route,
            duration,
            airplane: self.airplane,
            crews: self.crews,
            taken_seats,
        }
    }
}

/// A flight as shown in lists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightListing {
    /// Flight ID
    pub id: FlightId,
    /// Departure time
    pub departure_time: DateTime<Utc>,
    /// Arrival time
    pub arrival_time: DateTime<Utc>,
    /// Route
    pub route: RouteListing,
    /// `"{h}h {m}m"`
    pub duration: String,
    /// Distinct crew members
    #[serde(rename = "crews")]
    pub crew_count: usize,
    /// Airplane
    pub airplane: AirplaneListing,
    /// Seats still free
    pub tickets_available: i64,
}

/// A single flight with crew and seat map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightDetail {
    /// Flight ID
    pub id: FlightId,
    /// Departure time
    pub departure_time: DateTime<Utc>,
    /// Arrival time
    pub arrival_time: DateTime<Utc>,
    /// Route
    pub route: RouteListing,
    /// `"{h}h {m}m"`
    pub duration: String,
    /// Airplane
    pub airplane: AirplaneListing,
    /// Assigned crew
    pub crews: Vec<CrewListing>,
    /// Sold seats grouped by row
    pub taken_seats: TakenSeats,
}
