//! Authenticated reads.

use crate::error::{BookingError, Result};
use crate::filter::{CrewFilter, FlightFilter, TicketFilter};
use crate::identity::{authenticated, Identity, OrderScope};
use crate::store::BookingQueries;
use crate::types::{
    AirplaneId, AirplaneType, AirplaneTypeId, AirportId, CityId, Country, CountryId, CrewId,
    EntityKind, FlightId, OrderId, Position, PositionId, RouteId, TicketId,
};
use crate::views::{
    AirplaneListing, AirportListing, CityListing, CrewListing, FlightDetail, FlightListing,
    OrderListing, RouteListing, TicketListing,
};
use std::sync::Arc;

/// The item of `items` with id `id`, or `NotFound`.
fn find<T>(items: Vec<T>, kind: EntityKind, id: i64, id_of: impl Fn(&T) -> i64) -> Result<T> {
    items
        .into_iter()
        .find(|item| id_of(item) == id)
        .ok_or_else(|| BookingError::not_found(kind, id))
}

/// Read side of the booking system.
///
/// Every read requires an identity. Orders are additionally scoped: staff see
/// all of them, everyone else only their own.
pub struct QueryService<S> {
    store: Arc<S>,
}

impl<S> Clone for QueryService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: BookingQueries> QueryService<S> {
    /// Creates a new `QueryService`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Flights matching `filter`, with availability.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity, `Storage` on read failure.
    #[tracing::instrument(skip(self, identity))]
    pub async fn list_flights(
        &self,
        identity: Option<&Identity>,
        filter: &FlightFilter,
    ) -> Result<Vec<FlightListing>> {
        authenticated(identity)?;
        let flights = self.store.flights(filter).await?;
        Ok(flights.into_iter().map(|flight| flight.into_listing()).collect())
    }

    /// One flight with crew and taken seats.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity, `NotFound` for an unknown flight.
    #[tracing::instrument(skip(self, identity))]
    pub async fn flight_detail(
        &self,
        identity: Option<&Identity>,
        id: FlightId,
    ) -> Result<FlightDetail> {
        authenticated(identity)?;
        self.store
            .flight(id)
            .await?
            .map(|flight| flight.into_detail())
            .ok_or_else(|| BookingError::not_found(EntityKind::Flight, id.get()))
    }

    /// All routes.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity.
    pub async fn routes(&self, identity: Option<&Identity>) -> Result<Vec<RouteListing>> {
        authenticated(identity)?;
        self.store.routes().await
    }

    /// All airplanes.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity.
    pub async fn airplanes(&self, identity: Option<&Identity>) -> Result<Vec<AirplaneListing>> {
        authenticated(identity)?;
        self.store.airplanes().await
    }

    /// Crew members, optionally filtered by position name.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity.
    pub async fn crews(
        &self,
        identity: Option<&Identity>,
        filter: &CrewFilter,
    ) -> Result<Vec<CrewListing>> {
        authenticated(identity)?;
        self.store.crews(filter).await
    }

    /// Tickets, optionally filtered by airport names.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity.
    pub async fn tickets(
        &self,
        identity: Option<&Identity>,
        filter: &TicketFilter,
    ) -> Result<Vec<TicketListing>> {
        authenticated(identity)?;
        self.store.tickets(filter).await
    }

    /// Orders visible to the caller.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity.
    #[tracing::instrument(skip(self, identity))]
    pub async fn orders(&self, identity: Option<&Identity>) -> Result<Vec<OrderListing>> {
        let identity = authenticated(identity)?;
        let scope = OrderScope::for_identity(identity);
        let orders = self.store.orders(scope).await?;
        tracing::debug!(?scope, count = orders.len(), "Listed orders");
        Ok(orders)
    }

    /// All countries.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity.
    pub async fn countries(&self, identity: Option<&Identity>) -> Result<Vec<Country>> {
        authenticated(identity)?;
        self.store.countries().await
    }

    /// Cities with their country names.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity.
    pub async fn cities(&self, identity: Option<&Identity>) -> Result<Vec<CityListing>> {
        authenticated(identity)?;
        self.store.cities().await
    }

    /// Airports with their city and country names.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity.
    pub async fn airports(&self, identity: Option<&Identity>) -> Result<Vec<AirportListing>> {
        authenticated(identity)?;
        self.store.airports().await
    }

    /// All airplane types.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity.
    pub async fn airplane_types(&self, identity: Option<&Identity>) -> Result<Vec<AirplaneType>> {
        authenticated(identity)?;
        self.store.airplane_types().await
    }

    /// All crew positions.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity.
    pub async fn positions(&self, identity: Option<&Identity>) -> Result<Vec<Position>> {
        authenticated(identity)?;
        self.store.positions().await
    }

    /// One country.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity, `NotFound` for an unknown id.
    pub async fn country(&self, identity: Option<&Identity>, id: CountryId) -> Result<Country> {
        let countries = self.countries(identity).await?;
        find(countries, EntityKind::Country, id.get(), |c| c.id.get())
    }

    /// One city.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity, `NotFound` for an unknown id.
    pub async fn city(&self, identity: Option<&Identity>, id: CityId) -> Result<CityListing> {
        let cities = self.cities(identity).await?;
        find(cities, EntityKind::City, id.get(), |c| c.id.get())
    }

    /// One airport.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity, `NotFound` for an unknown id.
    pub async fn airport(
        &self,
        identity: Option<&Identity>,
        id: AirportId,
    ) -> Result<AirportListing> {
        let airports = self.airports(identity).await?;
        find(airports, EntityKind::Airport, id.get(), |a| a.id.get())
    }

    /// One route.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity, `NotFound` for an unknown id.
    pub async fn route(&self, identity: Option<&Identity>, id: RouteId) -> Result<RouteListing> {
        let routes = self.routes(identity).await?;
        find(routes, EntityKind::Route, id.get(), |r| r.id.get())
    }

    /// One airplane type.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity, `NotFound` for an unknown id.
    pub async fn airplane_type(
        &self,
        identity: Option<&Identity>,
        id: AirplaneTypeId,
    ) -> Result<AirplaneType> {
        let types = self.airplane_types(identity).await?;
        find(types, EntityKind::AirplaneType, id.get(), |t| t.id.get())
    }

    /// One airplane.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity, `NotFound` for an unknown id.
    pub async fn airplane(
        &self,
        identity: Option<&Identity>,
        id: AirplaneId,
    ) -> Result<AirplaneListing> {
        let airplanes = self.airplanes(identity).await?;
        find(airplanes, EntityKind::Airplane, id.get(), |a| a.id.get())
    }

    /// One crew position.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity, `NotFound` for an unknown id.
    pub async fn position(&self, identity: Option<&Identity>, id: PositionId) -> Result<Position> {
        let positions = self.positions(identity).await?;
        find(positions, EntityKind::Position, id.get(), |p| p.id.get())
    }

    /// One crew member.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity, `NotFound` for an unknown id.
    pub async fn crew(&self, identity: Option<&Identity>, id: CrewId) -> Result<CrewListing> {
        let crews = self.crews(identity, &CrewFilter::default()).await?;
        find(crews, EntityKind::Crew, id.get(), |c| c.id.get())
    }

    /// One ticket.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity, `NotFound` for an unknown id.
    pub async fn ticket(&self, identity: Option<&Identity>, id: TicketId) -> Result<TicketListing> {
        let tickets = self.tickets(identity, &TicketFilter::default()).await?;
        find(tickets, EntityKind::Ticket, id.get(), |t| t.id.get())
    }

    /// One order visible to the caller. Another user's order is `NotFound`
    /// for non-staff callers.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without identity, `NotFound` for an unknown or hidden id.
    pub async fn order(&self, identity: Option<&Identity>, id: OrderId) -> Result<OrderListing> {
        let orders = self.orders(identity).await?;
        find(orders, EntityKind::Order, id.get(), |o| o.id.get())
    }
}
