//! Reference data writes.

use crate::error::{duplicate_name, insert_error, storage, violation, Violation};
use crate::PostgresBookingStore;
use flight_booking_core::{
    Airplane, AirplaneId, AirplaneType, AirplaneTypeId, Airport, AirportId, BookingError,
    CatalogStore, City, CityId, Country, CountryId, Crew, CrewId, EntityKind, EntityRef, Flight,
    FlightId, NewAirplane, NewCrew, NewFlight, NewRoute, Position, PositionId, Result, Route,
    RouteId,
};

/// Table holding each kind of entity.
pub(crate) const fn table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Country => "countries",
        EntityKind::City => "cities",
        EntityKind::Airport => "airports",
        EntityKind::Route => "routes",
        EntityKind::AirplaneType => "airplane_types",
        EntityKind::Airplane => "airplanes",
        EntityKind::Position => "positions",
        EntityKind::Crew => "crews",
        EntityKind::Flight => "flights",
        EntityKind::Ticket => "tickets",
        EntityKind::Order => "orders",
    }
}

impl PostgresBookingStore {
    /// Insert a row holding only a unique name and return its id.
    async fn insert_named(&self, kind: EntityKind, name: &str) -> Result<i64> {
        let sql = format!("INSERT INTO {} (name) VALUES ($1) RETURNING id", table(kind));
        let (id,): (i64,) = sqlx::query_as(&sql)
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                insert_error(
                    &format!("create {kind}"),
                    &e,
                    || duplicate_name(kind, name),
                    |_| (kind, 0),
                )
            })?;
        tracing::debug!(entity = %kind, id, name, "Created");
        Ok(id)
    }
}

impl CatalogStore for PostgresBookingStore {
    async fn create_country(&self, name: &str) -> Result<Country> {
        let id = self.insert_named(EntityKind::Country, name).await?;
        Ok(Country {
            id: CountryId::new(id),
            name: name.to_string(),
        })
    }

    async fn create_city(&self, name: &str, country: CountryId) -> Result<City> {
        let (id,): (i64,) =
            sqlx::query_as("INSERT INTO cities (name, country_id) VALUES ($1, $2) RETURNING id")
                .bind(name)
                .bind(country.get())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    insert_error(
                        "create city",
                        &e,
                        || duplicate_name(EntityKind::City, name),
                        |_| (EntityKind::Country, country.get()),
                    )
                })?;

        Ok(City {
            id: CityId::new(id),
            name: name.to_string(),
            country,
        })
    }

    async fn create_airport(&self, name: &str, city: CityId) -> Result<Airport> {
        let (id,): (i64,) =
            sqlx::query_as("INSERT INTO airports (name, city_id) VALUES ($1, $2) RETURNING id")
                .bind(name)
                .bind(city.get())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    insert_error(
                        "create airport",
                        &e,
                        || duplicate_name(EntityKind::Airport, name),
                        |_| (EntityKind::City, city.get()),
                    )
                })?;

        Ok(Airport {
            id: AirportId::new(id),
            name: name.to_string(),
            city,
        })
    }

    async fn create_route(&self, route: &NewRoute) -> Result<Route> {
        let (id,): (i64,) = sqlx::query_as(
            r"
            INSERT INTO routes (source_id, destination_id, distance)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(route.source.get())
        .bind(route.destination.get())
        .bind(route.distance)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            insert_error(
                "create route",
                &e,
                || BookingError::Duplicate {
                    entity: EntityKind::Route,
                    value: format!(
                        "source {} and destination {}",
                        route.source, route.destination
                    ),
                },
                |constraint| match constraint {
                    Some("routes_source_id_fkey") => (EntityKind::Airport, route.source.get()),
                    _ => (EntityKind::Airport, route.destination.get()),
                },
            )
        })?;

        Ok(Route {
            id: RouteId::new(id),
            source: route.source,
            destination: route.destination,
            distance: route.distance,
        })
    }

    async fn create_airplane_type(&self, name: &str) -> Result<AirplaneType> {
        let id = self.insert_named(EntityKind::AirplaneType, name).await?;
        Ok(AirplaneType {
            id: AirplaneTypeId::new(id),
            name: name.to_string(),
        })
    }

    async fn create_airplane(&self, airplane: &NewAirplane) -> Result<Airplane> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO airplanes (name, "rows", seats_in_row, airplane_type_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&airplane.name)
        .bind(airplane.rows)
        .bind(airplane.seats_in_row)
        .bind(airplane.airplane_type.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            insert_error(
                "create airplane",
                &e,
                || duplicate_name(EntityKind::Airplane, &airplane.name),
                |_| (EntityKind::AirplaneType, airplane.airplane_type.get()),
            )
        })?;

        Ok(Airplane {
            id: AirplaneId::new(id),
            name: airplane.name.clone(),
            rows: airplane.rows,
            seats_in_row: airplane.seats_in_row,
            airplane_type: airplane.airplane_type,
        })
    }

    async fn create_position(&self, name: &str) -> Result<Position> {
        let id = self.insert_named(EntityKind::Position, name).await?;
        Ok(Position {
            id: PositionId::new(id),
            name: name.to_string(),
        })
    }

    async fn create_crew(&self, crew: &NewCrew) -> Result<Crew> {
        let (id,): (i64,) = sqlx::query_as(
            r"
            INSERT INTO crews (first_name, last_name, position_id)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(&crew.first_name)
        .bind(&crew.last_name)
        .bind(crew.position.map(PositionId::get))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            insert_error(
                "create crew",
                &e,
                || BookingError::Storage(format!("Failed to create crew: {e}")),
                |_| {
                    (
                        EntityKind::Position,
                        crew.position.map_or(0, PositionId::get),
                    )
                },
            )
        })?;

        Ok(Crew {
            id: CrewId::new(id),
            first_name: crew.first_name.clone(),
            last_name: crew.last_name.clone(),
            position: crew.position,
        })
    }

    async fn create_flight(&self, flight: &NewFlight) -> Result<Flight> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage("begin transaction", &e))?;

        let (id,): (i64,) = sqlx::query_as(
            r"
            INSERT INTO flights (route_id, airplane_id, departure_time, arrival_time)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(flight.route.get())
        .bind(flight.airplane.get())
        .bind(flight.departure_time)
        .bind(flight.arrival_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            insert_error(
                "create flight",
                &e,
                || BookingError::Storage(format!("Failed to create flight: {e}")),
                |constraint| match constraint {
                    Some("flights_route_id_fkey") => (EntityKind::Route, flight.route.get()),
                    _ => (EntityKind::Airplane, flight.airplane.get()),
                },
            )
        })?;

        let mut crews = flight.crews.clone();
        crews.sort_unstable();
        crews.dedup();
        for crew in &crews {
            sqlx::query("INSERT INTO flight_crews (flight_id, crew_id) VALUES ($1, $2)")
                .bind(id)
                .bind(crew.get())
                .execute(&mut *tx)
                .await
                .map_err(|e| match violation(&e) {
                    Some(Violation::ForeignKey(_)) => {
                        BookingError::not_found(EntityKind::Crew, crew.get())
                    }
                    _ => storage("assign crew", &e),
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| storage("commit flight", &e))?;

        tracing::debug!(flight_id = id, crews = crews.len(), "Flight created");
        Ok(Flight {
            id: FlightId::new(id),
            route: flight.route,
            airplane: flight.airplane,
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
            crews,
        })
    }

    async fn delete(&self, target: EntityRef) -> Result<()> {
        let (kind, id) = target.parts();
        let sql = format!("DELETE FROM {} WHERE id = $1", table(kind));

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match violation(&e) {
                Some(Violation::ForeignKey(_)) => BookingError::Protected { entity: kind, id },
                _ => storage(&format!("delete {kind}"), &e),
            })?;

        if result.rows_affected() == 0 {
            return Err(BookingError::not_found(kind, id));
        }
        Ok(())
    }
}
