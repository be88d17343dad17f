//! Row shapes returned by the read queries.

use chrono::{DateTime, Utc};
use flight_booking_core::{
    AirplaneId, AirplaneListing, AirportId, AirportListing, CityId, CityListing, CrewId,
    CrewListing, FlightId, OrderId, RouteId, RouteListing, SeatPosition, TicketId,
    TicketListing,
};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct FlightRow {
    pub id: i64,
    pub route_id: i64,
    pub airplane_id: i64,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CityRow {
    pub id: i64,
    pub name: String,
    pub country: String,
}

impl From<CityRow> for CityListing {
    fn from(row: CityRow) -> Self {
        Self {
            id: CityId::new(row.id),
            name: row.name,
            country: row.country,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AirportRow {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub city: String,
}

impl From<AirportRow> for AirportListing {
    fn from(row: AirportRow) -> Self {
        Self {
            id: AirportId::new(row.id),
            name: row.name,
            country: row.country,
            city: row.city,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RouteRow {
    pub id: i64,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_country: String,
    pub departure_city: String,
    pub arrival_country: String,
    pub arrival_city: String,
    pub distance: i32,
}

impl From<RouteRow> for RouteListing {
    fn from(row: RouteRow) -> Self {
        Self {
            id: RouteId::new(row.id),
            departure_airport: row.departure_airport,
            arrival_airport: row.arrival_airport,
            departure_country: row.departure_country,
            departure_city: row.departure_city,
            arrival_country: row.arrival_country,
            arrival_city: row.arrival_city,
            distance: row.distance,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AirplaneRow {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub airplane_type: String,
}

impl From<AirplaneRow> for AirplaneListing {
    fn from(row: AirplaneRow) -> Self {
        Self {
            id: AirplaneId::new(row.id),
            name: row.name,
            rows: row.rows,
            seats_in_row: row.seats_in_row,
            airplane_type: row.airplane_type,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CrewRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
}

impl From<CrewRow> for CrewListing {
    fn from(row: CrewRow) -> Self {
        Self {
            id: CrewId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            position: row.position,
        }
    }
}

/// A crew member together with the flight it is assigned to.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct FlightCrewRow {
    pub flight_id: i64,
    #[sqlx(flatten)]
    pub crew: CrewRow,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SeatRow {
    pub flight_id: i64,
    pub row: i32,
    pub seat: i32,
}

impl SeatRow {
    pub(crate) const fn position(&self) -> SeatPosition {
        SeatPosition::new(self.row, self.seat)
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TicketRow {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub flight_id: i64,
    pub source: String,
    pub destination: String,
    pub order_id: i64,
}

impl From<TicketRow> for TicketListing {
    fn from(row: TicketRow) -> Self {
        Self {
            id: TicketId::new(row.id),
            row: row.row,
            seat: row.seat,
            flight: FlightId::new(row.flight_id),
            source: row.source,
            destination: row.destination,
            order: OrderId::new(row.order_id),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OrderRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
}
