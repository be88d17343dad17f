//! In-memory booking store.
//!
//! Implements every storage trait on top of plain maps so services can be
//! tested without a database. Semantics follow the Postgres schema: unique
//! names, protect/cascade/set-null on delete, and a unique `(flight, row,
//! seat)` per ticket.
//!
//! Transactions hold a single writer gate from `begin` until `commit` or
//! `rollback` and work on a staged copy of the tables, so concurrent orders
//! are serialised and a failed order leaves nothing behind. Reads go straight
//! to the published tables and never wait for the gate.

use flight_booking_core::availability::TakenSeats;
use flight_booking_core::{
    Airplane, AirplaneId, AirplaneListing, AirplaneType, AirplaneTypeId, Airport, AirportId,
    AirportListing, BookingError, BookingQueries, BookingTransaction, CatalogStore, City,
    CityId, CityListing, Country, CountryId, Crew, CrewFilter, CrewId, CrewListing, EntityKind, EntityRef, Flight,
    FlightFilter, FlightId, FlightSnapshot, NewAirplane, NewCrew, NewFlight, NewRoute, Order,
    OrderId, OrderListing, OrderScope, Position, PositionId, Result, Route, RouteId,
    RouteListing, SeatGrid, SeatPosition, Ticket, TicketFilter, TicketId, TicketListing,
    TicketRequest, UnitOfWork, UserId,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{Mutex, OwnedMutexGuard};

fn poisoned<T>(_: PoisonError<T>) -> BookingError {
    BookingError::Storage("in-memory store lock poisoned".to_string())
}

fn dangling(kind: EntityKind, id: i64) -> BookingError {
    BookingError::Storage(format!("dangling reference to {kind} {id}"))
}

fn duplicate_name(entity: EntityKind, name: &str) -> BookingError {
    BookingError::Duplicate {
        entity,
        value: format!("name {name}"),
    }
}

#[derive(Clone, Debug, Default)]
struct Tables {
    sequences: HashMap<EntityKind, i64>,
    countries: BTreeMap<CountryId, Country>,
    cities: BTreeMap<CityId, City>,
    airports: BTreeMap<AirportId, Airport>,
    routes: BTreeMap<RouteId, Route>,
    airplane_types: BTreeMap<AirplaneTypeId, AirplaneType>,
    airplanes: BTreeMap<AirplaneId, Airplane>,
    positions: BTreeMap<PositionId, Position>,
    crews: BTreeMap<CrewId, Crew>,
    flights: BTreeMap<FlightId, Flight>,
    tickets: BTreeMap<TicketId, Ticket>,
    orders: BTreeMap<OrderId, Order>,
}

impl Tables {
    fn next_id(&mut self, kind: EntityKind) -> i64 {
        let id = self.sequences.entry(kind).or_insert(0);
        *id += 1;
        *id
    }

    fn is_seat_taken(&self, flight: FlightId, seat: SeatPosition) -> bool {
        self.tickets
            .values()
            .any(|ticket| ticket.flight == flight && ticket.position() == seat)
    }

    fn seats(&self, flight: FlightId) -> Vec<SeatPosition> {
        self.tickets
            .values()
            .filter(|ticket| ticket.flight == flight)
            .map(Ticket::position)
            .collect()
    }

    fn route_listing(&self, id: RouteId) -> Result<RouteListing> {
        let route = self
            .routes
            .get(&id)
            .ok_or_else(|| dangling(EntityKind::Route, id.get()))?;
        let (source, source_city, source_country) = self.airport_names(route.source)?;
        let (destination, destination_city, destination_country) =
            self.airport_names(route.destination)?;

        Ok(RouteListing {
            id,
            departure_airport: source,
            arrival_airport: destination,
            departure_country: source_country,
            departure_city: source_city,
            arrival_country: destination_country,
            arrival_city: destination_city,
            distance: route.distance,
        })
    }

    /// `(airport, city, country)` names.
    fn airport_names(&self, id: AirportId) -> Result<(String, String, String)> {
        let airport = self
            .airports
            .get(&id)
            .ok_or_else(|| dangling(EntityKind::Airport, id.get()))?;
        let city = self
            .cities
            .get(&airport.city)
            .ok_or_else(|| dangling(EntityKind::City, airport.city.get()))?;
        let country = self
            .countries
            .get(&city.country)
            .ok_or_else(|| dangling(EntityKind::Country, city.country.get()))?;
        Ok((airport.name.clone(), city.name.clone(), country.name.clone()))
    }

    fn airplane_listing(&self, id: AirplaneId) -> Result<AirplaneListing> {
        let airplane = self
            .airplanes
            .get(&id)
            .ok_or_else(|| dangling(EntityKind::Airplane, id.get()))?;
        let airplane_type = self
            .airplane_types
            .get(&airplane.airplane_type)
            .ok_or_else(|| dangling(EntityKind::AirplaneType, airplane.airplane_type.get()))?;

        Ok(AirplaneListing {
            id,
            name: airplane.name.clone(),
            rows: airplane.rows,
            seats_in_row: airplane.seats_in_row,
            airplane_type: airplane_type.name.clone(),
        })
    }

    fn crew_listing(&self, crew: &Crew) -> CrewListing {
        CrewListing {
            id: crew.id,
            first_name: crew.first_name.clone(),
            last_name: crew.last_name.clone(),
            position: crew
                .position
                .and_then(|id| self.positions.get(&id))
                .map(|position| position.name.clone()),
        }
    }

    fn snapshot(&self, flight: &Flight) -> Result<FlightSnapshot> {
        let crews = flight
            .crews
            .iter()
            .map(|id| {
                self.crews
                    .get(id)
                    .map(|crew| self.crew_listing(crew))
                    .ok_or_else(|| dangling(EntityKind::Crew, id.get()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FlightSnapshot {
            flight: flight.clone(),
            route: self.route_listing(flight.route)?,
            airplane: self.airplane_listing(flight.airplane)?,
            crews,
            seats: self.seats(flight.id),
        })
    }

    fn ticket_listing(&self, ticket: &Ticket) -> Result<TicketListing> {
        let flight = self
            .flights
            .get(&ticket.flight)
            .ok_or_else(|| dangling(EntityKind::Flight, ticket.flight.get()))?;
        let route = self.route_listing(flight.route)?;

        Ok(TicketListing {
            id: ticket.id,
            row: ticket.row,
            seat: ticket.seat,
            flight: ticket.flight,
            source: route.departure_airport,
            destination: route.arrival_airport,
            order: ticket.order,
        })
    }

    fn insert_ticket(&mut self, order: OrderId, request: TicketRequest) -> Result<Ticket> {
        if !self.orders.contains_key(&order) {
            return Err(BookingError::not_found(EntityKind::Order, order.get()));
        }
        if !self.flights.contains_key(&request.flight) {
            return Err(BookingError::not_found(EntityKind::Flight, request.flight.get()));
        }
        if self.is_seat_taken(request.flight, request.position()) {
            return Err(BookingError::SeatTaken {
                flight: request.flight,
                row: request.row,
                seat: request.seat,
            });
        }

        let ticket = Ticket {
            id: TicketId::new(self.next_id(EntityKind::Ticket)),
            row: request.row,
            seat: request.seat,
            flight: request.flight,
            order,
        };
        self.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    fn delete(&mut self, target: EntityRef) -> Result<()> {
        let (entity, raw) = target.parts();
        let protected = || BookingError::Protected { entity, id: raw };
        let missing = || BookingError::not_found(entity, raw);

        match target {
            EntityRef::Country(id) => {
                if self.cities.values().any(|city| city.country == id) {
                    return Err(protected());
                }
                self.countries.remove(&id).ok_or_else(missing)?;
            }
            EntityRef::City(id) => {
                if self.airports.values().any(|airport| airport.city == id) {
                    return Err(protected());
                }
                self.cities.remove(&id).ok_or_else(missing)?;
            }
            EntityRef::Airport(id) => {
                if self
                    .routes
                    .values()
                    .any(|route| route.source == id || route.destination == id)
                {
                    return Err(protected());
                }
                self.airports.remove(&id).ok_or_else(missing)?;
            }
            EntityRef::Route(id) => {
                if self.flights.values().any(|flight| flight.route == id) {
                    return Err(protected());
                }
                self.routes.remove(&id).ok_or_else(missing)?;
            }
            EntityRef::AirplaneType(id) => {
                if self.airplanes.values().any(|plane| plane.airplane_type == id) {
                    return Err(protected());
                }
                self.airplane_types.remove(&id).ok_or_else(missing)?;
            }
            EntityRef::Airplane(id) => {
                if self.flights.values().any(|flight| flight.airplane == id) {
                    return Err(protected());
                }
                self.airplanes.remove(&id).ok_or_else(missing)?;
            }
            EntityRef::Position(id) => {
                self.positions.remove(&id).ok_or_else(missing)?;
                for crew in self.crews.values_mut() {
                    if crew.position == Some(id) {
                        crew.position = None;
                    }
                }
            }
            EntityRef::Crew(id) => {
                self.crews.remove(&id).ok_or_else(missing)?;
                for flight in self.flights.values_mut() {
                    flight.crews.retain(|crew| *crew != id);
                }
            }
            EntityRef::Flight(id) => {
                self.flights.remove(&id).ok_or_else(missing)?;
                self.tickets.retain(|_, ticket| ticket.flight != id);
            }
            EntityRef::Ticket(id) => {
                self.tickets.remove(&id).ok_or_else(missing)?;
            }
            EntityRef::Order(id) => {
                self.orders.remove(&id).ok_or_else(missing)?;
                self.tickets.retain(|_, ticket| ticket.order != id);
            }
        }
        Ok(())
    }
}

/// Thread-safe in-memory implementation of every storage trait.
///
/// Clones share the same data.
///
/// # Example
///
/// ```
/// use flight_booking_testing::InMemoryBookingStore;
///
/// let store = InMemoryBookingStore::new();
/// assert_eq!(store.ticket_count().ok(), Some(0));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryBookingStore {
    tables: Arc<RwLock<Tables>>,
    writer: Arc<Mutex<()>>,
    fail_commits: Arc<AtomicBool>,
}

impl InMemoryBookingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent commit fail with [`BookingError::Storage`].
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Number of committed tickets.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] if the lock is poisoned.
    pub fn ticket_count(&self) -> Result<usize> {
        self.read(|tables| Ok(tables.tickets.len()))
    }

    /// Number of committed orders.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] if the lock is poisoned.
    pub fn order_count(&self) -> Result<usize> {
        self.read(|tables| Ok(tables.orders.len()))
    }

    /// Committed taken seats for `flight`, grouped by row.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] if the lock is poisoned.
    pub fn taken_seats(&self, flight: FlightId) -> Result<TakenSeats> {
        self.read(|tables| {
            Ok(flight_booking_core::availability::taken_seats(
                &tables.seats(flight),
            ))
        })
    }

    fn read<R>(&self, f: impl FnOnce(&Tables) -> Result<R>) -> Result<R> {
        let tables = self.tables.read().map_err(poisoned)?;
        f(&tables)
    }

    async fn write<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Tables) -> Result<R> + Send,
        R: Send,
    {
        let _gate = self.writer.lock().await;
        let mut tables = self.tables.write().map_err(poisoned)?;
        f(&mut tables)
    }
}

/// Transaction over a staged copy of the tables.
///
/// Holds the store's writer gate until it is committed, rolled back or
/// dropped.
#[derive(Debug)]
pub struct InMemoryTransaction {
    tables: Arc<RwLock<Tables>>,
    staged: Tables,
    fail_commit: bool,
    _gate: OwnedMutexGuard<()>,
}

impl UnitOfWork for InMemoryBookingStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction> {
        let gate = Arc::clone(&self.writer).lock_owned().await;
        let staged = self.read(|tables| Ok(tables.clone()))?;
        Ok(InMemoryTransaction {
            tables: Arc::clone(&self.tables),
            staged,
            fail_commit: self.fail_commits.load(Ordering::SeqCst),
            _gate: gate,
        })
    }
}

impl BookingTransaction for InMemoryTransaction {
    async fn lock_flight(&mut self, flight: FlightId) -> Result<Option<SeatGrid>> {
        self.staged
            .flights
            .get(&flight)
            .map(|flight| {
                self.staged
                    .airplanes
                    .get(&flight.airplane)
                    .map(Airplane::grid)
                    .ok_or_else(|| dangling(EntityKind::Airplane, flight.airplane.get()))
            })
            .transpose()
    }

    async fn is_seat_taken(&mut self, flight: FlightId, seat: SeatPosition) -> Result<bool> {
        Ok(self.staged.is_seat_taken(flight, seat))
    }

    async fn insert_order(&mut self, user: UserId, created_at: DateTime<Utc>) -> Result<Order> {
        let order = Order {
            id: OrderId::new(self.staged.next_id(EntityKind::Order)),
            created_at,
            user,
        };
        self.staged.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn insert_ticket(&mut self, order: OrderId, request: TicketRequest) -> Result<Ticket> {
        self.staged.insert_ticket(order, request)
    }

    async fn commit(self) -> Result<()> {
        if self.fail_commit {
            return Err(BookingError::Storage("commit failed".to_string()));
        }
        let mut tables = self.tables.write().map_err(poisoned)?;
        *tables = self.staged;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}

impl CatalogStore for InMemoryBookingStore {
    async fn create_country(&self, name: &str) -> Result<Country> {
        self.write(|tables| {
            if tables.countries.values().any(|country| country.name == name) {
                return Err(duplicate_name(EntityKind::Country, name));
            }
            let country = Country {
                id: CountryId::new(tables.next_id(EntityKind::Country)),
                name: name.to_string(),
            };
            tables.countries.insert(country.id, country.clone());
            Ok(country)
        })
        .await
    }

    async fn create_city(&self, name: &str, country: CountryId) -> Result<City> {
        self.write(|tables| {
            if !tables.countries.contains_key(&country) {
                return Err(BookingError::not_found(EntityKind::Country, country.get()));
            }
            if tables.cities.values().any(|city| city.name == name) {
                return Err(duplicate_name(EntityKind::City, name));
            }
            let city = City {
                id: CityId::new(tables.next_id(EntityKind::City)),
                name: name.to_string(),
                country,
            };
            tables.cities.insert(city.id, city.clone());
            Ok(city)
        })
        .await
    }

    async fn create_airport(&self, name: &str, city: CityId) -> Result<Airport> {
        self.write(|tables| {
            if !tables.cities.contains_key(&city) {
                return Err(BookingError::not_found(EntityKind::City, city.get()));
            }
            if tables.airports.values().any(|airport| airport.name == name) {
                return Err(duplicate_name(EntityKind::Airport, name));
            }
            let airport = Airport {
                id: AirportId::new(tables.next_id(EntityKind::Airport)),
                name: name.to_string(),
                city,
            };
            tables.airports.insert(airport.id, airport.clone());
            Ok(airport)
        })
        .await
    }

    async fn create_route(&self, route: &NewRoute) -> Result<Route> {
        self.write(|tables| {
            for airport in [route.source, route.destination] {
                if !tables.airports.contains_key(&airport) {
                    return Err(BookingError::not_found(EntityKind::Airport, airport.get()));
                }
            }
            if tables
                .routes
                .values()
                .any(|r| r.source == route.source && r.destination == route.destination)
            {
                return Err(BookingError::Duplicate {
                    entity: EntityKind::Route,
                    value: format!(
                        "source {} and destination {}",
                        route.source, route.destination
                    ),
                });
            }
            let created = Route {
                id: RouteId::new(tables.next_id(EntityKind::Route)),
                source: route.source,
                destination: route.destination,
                distance: route.distance,
            };
            tables.routes.insert(created.id, created.clone());
            Ok(created)
        })
        .await
    }

    async fn create_airplane_type(&self, name: &str) -> Result<AirplaneType> {
        self.write(|tables| {
            if tables.airplane_types.values().any(|kind| kind.name == name) {
                return Err(duplicate_name(EntityKind::AirplaneType, name));
            }
            let airplane_type = AirplaneType {
                id: AirplaneTypeId::new(tables.next_id(EntityKind::AirplaneType)),
                name: name.to_string(),
            };
            tables
                .airplane_types
                .insert(airplane_type.id, airplane_type.clone());
            Ok(airplane_type)
        })
        .await
    }

    async fn create_airplane(&self, airplane: &NewAirplane) -> Result<Airplane> {
        self.write(|tables| {
            if !tables.airplane_types.contains_key(&airplane.airplane_type) {
                return Err(BookingError::not_found(
                    EntityKind::AirplaneType,
                    airplane.airplane_type.get(),
                ));
            }
            if tables.airplanes.values().any(|plane| plane.name == airplane.name) {
                return Err(duplicate_name(EntityKind::Airplane, &airplane.name));
            }
            let created = Airplane {
                id: AirplaneId::new(tables.next_id(EntityKind::Airplane)),
                name: airplane.name.clone(),
                rows: airplane.rows,
                seats_in_row: airplane.seats_in_row,
                airplane_type: airplane.airplane_type,
            };
            tables.airplanes.insert(created.id, created.clone());
            Ok(created)
        })
        .await
    }

    async fn create_position(&self, name: &str) -> Result<Position> {
        self.write(|tables| {
            if tables.positions.values().any(|position| position.name == name) {
                return Err(duplicate_name(EntityKind::Position, name));
            }
            let position = Position {
                id: PositionId::new(tables.next_id(EntityKind::Position)),
                name: name.to_string(),
            };
            tables.positions.insert(position.id, position.clone());
            Ok(position)
        })
        .await
    }

    async fn create_crew(&self, crew: &NewCrew) -> Result<Crew> {
        self.write(|tables| {
            if let Some(position) = crew.position {
                if !tables.positions.contains_key(&position) {
                    return Err(BookingError::not_found(EntityKind::Position, position.get()));
                }
            }
            let created = Crew {
                id: CrewId::new(tables.next_id(EntityKind::Crew)),
                first_name: crew.first_name.clone(),
                last_name: crew.last_name.clone(),
                position: crew.position,
            };
            tables.crews.insert(created.id, created.clone());
            Ok(created)
        })
        .await
    }

    async fn create_flight(&self, flight: &NewFlight) -> Result<Flight> {
        self.write(|tables| {
            if !tables.routes.contains_key(&flight.route) {
                return Err(BookingError::not_found(EntityKind::Route, flight.route.get()));
            }
            if !tables.airplanes.contains_key(&flight.airplane) {
                return Err(BookingError::not_found(
                    EntityKind::Airplane,
                    flight.airplane.get(),
                ));
            }
            if let Some(crew) = flight.crews.iter().find(|id| !tables.crews.contains_key(id)) {
                return Err(BookingError::not_found(EntityKind::Crew, crew.get()));
            }

            let mut crews = flight.crews.clone();
            crews.sort_unstable();
            crews.dedup();

            let created = Flight {
                id: FlightId::new(tables.next_id(EntityKind::Flight)),
                route: flight.route,
                airplane: flight.airplane,
                departure_time: flight.departure_time,
                arrival_time: flight.arrival_time,
                crews,
            };
            tables.flights.insert(created.id, created.clone());
            Ok(created)
        })
        .await
    }

    async fn delete(&self, target: EntityRef) -> Result<()> {
        self.write(|tables| tables.delete(target)).await
    }
}

impl BookingQueries for InMemoryBookingStore {
    async fn flights(&self, filter: &FlightFilter) -> Result<Vec<FlightSnapshot>> {
        self.read(|tables| {
            let mut flights = Vec::new();
            for flight in tables.flights.values() {
                let snapshot = tables.snapshot(flight)?;
                if filter.matches(&snapshot) {
                    flights.push(snapshot);
                }
            }
            Ok(flights)
        })
    }

    async fn flight(&self, id: FlightId) -> Result<Option<FlightSnapshot>> {
        self.read(|tables| {
            tables
                .flights
                .get(&id)
                .map(|flight| tables.snapshot(flight))
                .transpose()
        })
    }

    async fn countries(&self) -> Result<Vec<Country>> {
        self.read(|tables| Ok(tables.countries.values().cloned().collect()))
    }

    async fn cities(&self) -> Result<Vec<CityListing>> {
        self.read(|tables| {
            tables
                .cities
                .values()
                .map(|city| {
                    let country = tables
                        .countries
                        .get(&city.country)
                        .ok_or_else(|| dangling(EntityKind::Country, city.country.get()))?;
                    Ok(CityListing {
                        id: city.id,
                        name: city.name.clone(),
                        country: country.name.clone(),
                    })
                })
                .collect()
        })
    }

    async fn airports(&self) -> Result<Vec<AirportListing>> {
        self.read(|tables| {
            tables
                .airports
                .keys()
                .map(|id| {
                    let (name, city, country) = tables.airport_names(*id)?;
                    Ok(AirportListing {
                        id: *id,
                        name,
                        country,
                        city,
                    })
                })
                .collect()
        })
    }

    async fn airplane_types(&self) -> Result<Vec<AirplaneType>> {
        self.read(|tables| Ok(tables.airplane_types.values().cloned().collect()))
    }

    async fn positions(&self) -> Result<Vec<Position>> {
        self.read(|tables| Ok(tables.positions.values().cloned().collect()))
    }

    async fn routes(&self) -> Result<Vec<RouteListing>> {
        self.read(|tables| {
            tables
                .routes
                .keys()
                .map(|id| tables.route_listing(*id))
                .collect()
        })
    }

    async fn airplanes(&self) -> Result<Vec<AirplaneListing>> {
        self.read(|tables| {
            tables
                .airplanes
                .keys()
                .map(|id| tables.airplane_listing(*id))
                .collect()
        })
    }

    async fn crews(&self, filter: &CrewFilter) -> Result<Vec<CrewListing>> {
        self.read(|tables| {
            Ok(tables
                .crews
                .values()
                .map(|crew| tables.crew_listing(crew))
                .filter(|crew| filter.matches(crew))
                .collect())
        })
    }

    async fn tickets(&self, filter: &TicketFilter) -> Result<Vec<TicketListing>> {
        self.read(|tables| {
            let mut tickets = Vec::new();
            for ticket in tables.tickets.values() {
                let listing = tables.ticket_listing(ticket)?;
                if filter.matches(&listing) {
                    tickets.push(listing);
                }
            }
            Ok(tickets)
        })
    }

    async fn orders(&self, scope: OrderScope) -> Result<Vec<OrderListing>> {
        self.read(|tables| {
            tables
                .orders
                .values()
                .filter(|order| scope.includes(order.user))
                .map(|order| {
                    let tickets = tables
                        .tickets
                        .values()
                        .filter(|ticket| ticket.order == order.id)
                        .map(|ticket| tables.ticket_listing(ticket))
                        .collect::<Result<Vec<_>>>()?;
                    Ok(OrderListing {
                        id: order.id,
                        created_at: order.created_at,
                        user: order.user,
                        tickets,
                    })
                })
                .collect()
        })
    }
}
