//! Read models.
//!
//! Flights are selected with their filters first; routes, airplanes, crews and
//! sold seats are then loaded for the whole page in one query each and joined
//! in memory.

use crate::catalog::table;
use crate::error::storage;
use crate::rows::{
    AirplaneRow, AirportRow, CityRow, CrewRow, FlightCrewRow, FlightRow, OrderRow, RouteRow,
    SeatRow, TicketRow,
};
use crate::PostgresBookingStore;
use flight_booking_core::{
    AirplaneId, AirplaneListing, AirplaneType, AirplaneTypeId, AirportListing, BookingError,
    BookingQueries, CityListing, Country, CountryId, CrewFilter, CrewId, CrewListing, EntityKind,
    Flight, FlightFilter, FlightId, FlightSnapshot, OrderId, OrderListing, OrderScope, Position,
    PositionId, Result, RouteId, RouteListing, SeatPosition, TicketFilter, TicketListing, UserId,
};
use sqlx::{Postgres, QueryBuilder};
use std::collections::HashMap;

const ROUTE_SELECT: &str = r"
    SELECT r.id,
           sa.name AS departure_airport,
           da.name AS arrival_airport,
           sco.name AS departure_country,
           sc.name AS departure_city,
           dco.name AS arrival_country,
           dc.name AS arrival_city,
           r.distance
    FROM routes r
    JOIN airports sa ON sa.id = r.source_id
    JOIN cities sc ON sc.id = sa.city_id
    JOIN countries sco ON sco.id = sc.country_id
    JOIN airports da ON da.id = r.destination_id
    JOIN cities dc ON dc.id = da.city_id
    JOIN countries dco ON dco.id = dc.country_id
";

const AIRPLANE_SELECT: &str = r#"
    SELECT a.id, a.name, a."rows", a.seats_in_row, t.name AS airplane_type
    FROM airplanes a
    JOIN airplane_types t ON t.id = a.airplane_type_id
"#;

const TICKET_SELECT: &str = r#"
    SELECT t.id, t."row", t.seat, t.flight_id,
           sa.name AS source, da.name AS destination, t.order_id
    FROM tickets t
    JOIN flights f ON f.id = t.flight_id
    JOIN routes r ON r.id = f.route_id
    JOIN airports sa ON sa.id = r.source_id
    JOIN airports da ON da.id = r.destination_id
    WHERE TRUE
"#;

/// `%needle%` for `ILIKE`, with the pattern metacharacters escaped.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn ids<T>(items: &[T], id: impl Fn(&T) -> i64) -> Vec<i64> {
    let mut ids: Vec<i64> = items.iter().map(id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

impl PostgresBookingStore {
    /// `(id, name)` of every row of a name-only table, by id.
    async fn named_rows(&self, kind: EntityKind) -> Result<Vec<(i64, String)>> {
        let sql = format!("SELECT id, name FROM {} ORDER BY id", table(kind));
        sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage(&format!("list {kind}"), &e))
    }

    async fn flight_rows(
        &self,
        filter: &FlightFilter,
        only: Option<FlightId>,
    ) -> Result<Vec<FlightRow>> {
        let mut query = QueryBuilder::<Postgres>::new(
            r"
            SELECT f.id, f.route_id, f.airplane_id, f.departure_time, f.arrival_time
            FROM flights f
            JOIN routes r ON r.id = f.route_id
            JOIN airports sa ON sa.id = r.source_id
            JOIN cities sc ON sc.id = sa.city_id
            JOIN airports da ON da.id = r.destination_id
            JOIN cities dc ON dc.id = da.city_id
            WHERE TRUE
            ",
        );
        if let Some(id) = only {
            query.push(" AND f.id = ").push_bind(id.get());
        }
        if let Some(city) = &filter.departure_city {
            query
                .push(" AND sc.name ILIKE ")
                .push_bind(contains_pattern(city));
        }
        if let Some(city) = &filter.arrival_city {
            query
                .push(" AND dc.name ILIKE ")
                .push_bind(contains_pattern(city));
        }
        if let Some(day) = filter.departure_date {
            query
                .push(" AND (f.departure_time AT TIME ZONE 'UTC')::date = ")
                .push_bind(day);
        }
        if let Some(day) = filter.arrival_date {
            query
                .push(" AND (f.arrival_time AT TIME ZONE 'UTC')::date = ")
                .push_bind(day);
        }
        query.push(" ORDER BY f.id");

        query
            .build_query_as::<FlightRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage("list flights", &e))
    }

    async fn route_listings(&self, ids: &[i64]) -> Result<Vec<RouteListing>> {
        let sql = format!("{ROUTE_SELECT} WHERE r.id = ANY($1) ORDER BY r.id");
        let rows: Vec<RouteRow> = sqlx::query_as(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage("load routes", &e))?;
        Ok(rows.into_iter().map(RouteListing::from).collect())
    }

    async fn airplane_listings(&self, ids: &[i64]) -> Result<Vec<AirplaneListing>> {
        let sql = format!("{AIRPLANE_SELECT} WHERE a.id = ANY($1) ORDER BY a.id");
        let rows: Vec<AirplaneRow> = sqlx::query_as(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage("load airplanes", &e))?;
        Ok(rows.into_iter().map(AirplaneListing::from).collect())
    }

    async fn snapshots(&self, flights: Vec<FlightRow>) -> Result<Vec<FlightSnapshot>> {
        if flights.is_empty() {
            return Ok(Vec::new());
        }
        let flight_ids = ids(&flights, |f| f.id);

        let routes: HashMap<RouteId, RouteListing> = self
            .route_listings(&ids(&flights, |f| f.route_id))
            .await?
            .into_iter()
            .map(|route| (route.id, route))
            .collect();
        let airplanes: HashMap<AirplaneId, AirplaneListing> = self
            .airplane_listings(&ids(&flights, |f| f.airplane_id))
            .await?
            .into_iter()
            .map(|airplane| (airplane.id, airplane))
            .collect();

        let crew_rows: Vec<FlightCrewRow> = sqlx::query_as(
            r"
            SELECT fc.flight_id, c.id, c.first_name, c.last_name, p.name AS position
            FROM flight_crews fc
            JOIN crews c ON c.id = fc.crew_id
            LEFT JOIN positions p ON p.id = c.position_id
            WHERE fc.flight_id = ANY($1)
            ORDER BY fc.flight_id, c.id
            ",
        )
        .bind(&flight_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage("load flight crews", &e))?;

        let seat_rows: Vec<SeatRow> = sqlx::query_as(
            r#"
            SELECT flight_id, "row", seat
            FROM tickets
            WHERE flight_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&flight_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage("load sold seats", &e))?;

        let mut crews: HashMap<i64, Vec<CrewListing>> = HashMap::new();
        for row in crew_rows {
            crews.entry(row.flight_id).or_default().push(row.crew.into());
        }
        let mut seats: HashMap<i64, Vec<SeatPosition>> = HashMap::new();
        for row in seat_rows {
            seats.entry(row.flight_id).or_default().push(row.position());
        }

        flights
            .into_iter()
            .map(|row| {
                let route_id = RouteId::new(row.route_id);
                let airplane_id = AirplaneId::new(row.airplane_id);
                let route = routes
                    .get(&route_id)
                    .cloned()
                    .ok_or_else(|| dangling(EntityKind::Route, row.route_id))?;
                let airplane = airplanes
                    .get(&airplane_id)
                    .cloned()
                    .ok_or_else(|| dangling(EntityKind::Airplane, row.airplane_id))?;
                let crews = crews.remove(&row.id).unwrap_or_default();

                Ok(FlightSnapshot {
                    flight: Flight {
                        id: FlightId::new(row.id),
                        route: route_id,
                        airplane: airplane_id,
                        departure_time: row.departure_time,
                        arrival_time: row.arrival_time,
                        crews: crews.iter().map(|crew| crew.id).collect::<Vec<CrewId>>(),
                    },
                    route,
                    airplane,
                    crews,
                    seats: seats.remove(&row.id).unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn ticket_rows(
        &self,
        filter: &TicketFilter,
        orders: Option<&[i64]>,
    ) -> Result<Vec<TicketListing>> {
        let mut query = QueryBuilder::<Postgres>::new(TICKET_SELECT);
        if let Some(source) = &filter.source {
            query
                .push(" AND sa.name ILIKE ")
                .push_bind(contains_pattern(source));
        }
        if let Some(destination) = &filter.destination {
            query
                .push(" AND da.name ILIKE ")
                .push_bind(contains_pattern(destination));
        }
        if let Some(orders) = orders {
            query.push(" AND t.order_id = ANY(").push_bind(orders.to_vec()).push(")");
        }
        query.push(" ORDER BY t.id");

        let rows = query
            .build_query_as::<TicketRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage("list tickets", &e))?;
        Ok(rows.into_iter().map(TicketListing::from).collect())
    }
}

fn dangling(kind: EntityKind, id: i64) -> BookingError {
    BookingError::Storage(format!("dangling reference to {kind} {id}"))
}

impl BookingQueries for PostgresBookingStore {
    #[tracing::instrument(skip(self))]
    async fn flights(&self, filter: &FlightFilter) -> Result<Vec<FlightSnapshot>> {
        let rows = self.flight_rows(filter, None).await?;
        self.snapshots(rows).await
    }

    async fn flight(&self, id: FlightId) -> Result<Option<FlightSnapshot>> {
        let rows = self.flight_rows(&FlightFilter::default(), Some(id)).await?;
        Ok(self.snapshots(rows).await?.into_iter().next())
    }

    async fn countries(&self) -> Result<Vec<Country>> {
        let rows = self.named_rows(EntityKind::Country).await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| Country {
                id: CountryId::new(id),
                name,
            })
            .collect())
    }

    async fn cities(&self) -> Result<Vec<CityListing>> {
        let rows: Vec<CityRow> = sqlx::query_as(
            r"
            SELECT c.id, c.name, co.name AS country
            FROM cities c
            JOIN countries co ON co.id = c.country_id
            ORDER BY c.id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage("list cities", &e))?;
        Ok(rows.into_iter().map(CityListing::from).collect())
    }

    async fn airports(&self) -> Result<Vec<AirportListing>> {
        let rows: Vec<AirportRow> = sqlx::query_as(
            r"
            SELECT a.id, a.name, co.name AS country, c.name AS city
            FROM airports a
            JOIN cities c ON c.id = a.city_id
            JOIN countries co ON co.id = c.country_id
            ORDER BY a.id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage("list airports", &e))?;
        Ok(rows.into_iter().map(AirportListing::from).collect())
    }

    async fn airplane_types(&self) -> Result<Vec<AirplaneType>> {
        let rows = self.named_rows(EntityKind::AirplaneType).await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| AirplaneType {
                id: AirplaneTypeId::new(id),
                name,
            })
            .collect())
    }

    async fn positions(&self) -> Result<Vec<Position>> {
        let rows = self.named_rows(EntityKind::Position).await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| Position {
                id: PositionId::new(id),
                name,
            })
            .collect())
    }

    async fn routes(&self) -> Result<Vec<RouteListing>> {
        let sql = format!("{ROUTE_SELECT} ORDER BY r.id");
        let rows: Vec<RouteRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage("list routes", &e))?;
        Ok(rows.into_iter().map(RouteListing::from).collect())
    }

    async fn airplanes(&self) -> Result<Vec<AirplaneListing>> {
        let sql = format!("{AIRPLANE_SELECT} ORDER BY a.id");
        let rows: Vec<AirplaneRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage("list airplanes", &e))?;
        Ok(rows.into_iter().map(AirplaneListing::from).collect())
    }

    async fn crews(&self, filter: &CrewFilter) -> Result<Vec<CrewListing>> {
        let mut query = QueryBuilder::<Postgres>::new(
            r"
            SELECT c.id, c.first_name, c.last_name, p.name AS position
            FROM crews c
            LEFT JOIN positions p ON p.id = c.position_id
            WHERE TRUE
            ",
        );
        if let Some(position) = &filter.position {
            query
                .push(" AND p.name ILIKE ")
                .push_bind(contains_pattern(position));
        }
        query.push(" ORDER BY c.id");

        let rows = query
            .build_query_as::<CrewRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage("list crews", &e))?;
        Ok(rows.into_iter().map(CrewListing::from).collect())
    }

    async fn tickets(&self, filter: &TicketFilter) -> Result<Vec<TicketListing>> {
        self.ticket_rows(filter, None).await
    }

    #[tracing::instrument(skip(self))]
    async fn orders(&self, scope: OrderScope) -> Result<Vec<OrderListing>> {
        let mut query =
            QueryBuilder::<Postgres>::new("SELECT id, created_at, user_id FROM orders WHERE TRUE");
        if let OrderScope::Owner(user) = scope {
            query.push(" AND user_id = ").push_bind(user.get());
        }
        query.push(" ORDER BY id");

        let orders = query
            .build_query_as::<OrderRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage("list orders", &e))?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids = ids(&orders, |o| o.id);
        let mut tickets: HashMap<OrderId, Vec<TicketListing>> = HashMap::new();
        for ticket in self
            .ticket_rows(&TicketFilter::default(), Some(&order_ids))
            .await?
        {
            tickets.entry(ticket.order).or_default().push(ticket);
        }

        Ok(orders
            .into_iter()
            .map(|row| {
                let id = OrderId::new(row.id);
                OrderListing {
                    id,
                    created_at: row.created_at,
                    user: UserId::new(row.user_id),
                    tickets: tickets.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }
}
