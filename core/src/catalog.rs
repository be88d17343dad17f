//! Staff maintenance of reference data.
//!
//! Every operation requires an elevated identity. Inputs are validated here;
//! uniqueness, referential integrity and delete protection are enforced by the
//! store.

use crate::error::{BookingError, Result};
use crate::identity::{elevated, Identity};
use crate::store::CatalogStore;
use crate::types::{
    Airplane, AirplaneType, Airport, City, CityId, Country, CountryId, Crew,
    EntityRef, Flight, NewAirplane, NewCrew, NewFlight, NewRoute, Position, Route,
};
use std::sync::Arc;

fn require_name(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BookingError::invalid(field, "must not be empty"));
    }
    Ok(())
}

fn require_positive(field: &'static str, value: i32) -> Result<()> {
    if value < 1 {
        return Err(BookingError::invalid(
            field,
            format!("must be at least 1, not {value}"),
        ));
    }
    Ok(())
}

/// Validated, permission-checked catalog writes.
pub struct CatalogService<S> {
    store: Arc<S>,
}

impl<S> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CatalogStore> CatalogService<S> {
    /// Creates a new `CatalogService`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a country.
    ///
    /// # Errors
    ///
    /// `Unauthorized`/`Forbidden` without staff identity, `InvalidField` for an
    /// empty name, `Duplicate` if it exists.
    #[tracing::instrument(skip(self, identity))]
    pub async fn create_country(&self, identity: Option<&Identity>, name: &str) -> Result<Country> {
        elevated(identity)?;
        require_name("name", name)?;
        self.store.create_country(name).await
    }

    /// Create a city in `country`.
    ///
    /// # Errors
    ///
    /// As [`create_country`](Self::create_country), plus `NotFound` for an
    /// unknown country.
    #[tracing::instrument(skip(self, identity))]
    pub async fn create_city(
        &self,
        identity: Option<&Identity>,
        name: &str,
        country: CountryId,
    ) -> Result<City> {
        elevated(identity)?;
        require_name("name", name)?;
        self.store.create_city(name, country).await
    }

    /// Create an airport in `city`.
    ///
    /// # Errors
    ///
    /// As [`create_city`](Self::create_city).
    #[tracing::instrument(skip(self, identity))]
    pub async fn create_airport(
        &self,
        identity: Option<&Identity>,
        name: &str,
        city: CityId,
    ) -> Result<Airport> {
        elevated(identity)?;
        require_name("name", name)?;
        self.store.create_airport(name, city).await
    }

    /// Create a route.
    ///
    /// # Errors
    ///
    /// `InvalidField` for a non-positive distance,
    /// `Duplicate` if the pair exists, `NotFound` for unknown airports.
    #[tracing::instrument(skip(self, identity))]
    pub async fn create_route(&self, identity: Option<&Identity>, route: NewRoute) -> Result<Route> {
        elevated(identity)?;
        require_positive("distance", route.distance)?;
        self.store.create_route(&route).await
    }

    /// Create an airplane type.
    ///
    /// # Errors
    ///
    /// As [`create_country`](Self::create_country).
    #[tracing::instrument(skip(self, identity))]
    pub async fn create_airplane_type(
        &self,
        identity: Option<&Identity>,
        name: &str,
    ) -> Result<AirplaneType> {
        elevated(identity)?;
        require_name("name", name)?;
        self.store.create_airplane_type(name).await
    }

    /// Create an airplane.
    ///
    /// # Errors
    ///
    /// `InvalidField` for an empty name or a grid dimension below 1,
    /// `Duplicate` for a taken name, `NotFound` for an unknown type.
    #[tracing::instrument(skip(self, identity))]
    pub async fn create_airplane(
        &self,
        identity: Option<&Identity>,
        airplane: NewAirplane,
    ) -> Result<Airplane> {
        elevated(identity)?;
        require_name("name", &airplane.name)?;
        require_positive("rows", airplane.rows)?;
        require_positive("seats_in_row", airplane.seats_in_row)?;
        self.store.create_airplane(&airplane).await
    }

    /// Create a crew position.
    ///
    /// # Errors
    ///
    /// As [`create_country`](Self::create_country).
    #[tracing::instrument(skip(self, identity))]
    pub async fn create_position(&self, identity: Option<&Identity>, name: &str) -> Result<Position> {
        elevated(identity)?;
        require_name("name", name)?;
        self.store.create_position(name).await
    }

    /// Create a crew member.
    ///
    /// # Errors
    ///
    /// `InvalidField` for empty names, `NotFound` for an unknown position.
    #[tracing::instrument(skip(self, identity))]
    pub async fn create_crew(&self, identity: Option<&Identity>, crew: NewCrew) -> Result<Crew> {
        elevated(identity)?;
        require_name("first_name", &crew.first_name)?;
        require_name("last_name", &crew.last_name)?;
        self.store.create_crew(&crew).await
    }

    /// Schedule a flight.
    ///
    /// # Errors
    ///
    /// `InvalidField` unless arrival is after departure, `NotFound` for an
    /// unknown route, airplane or crew member.
    #[tracing::instrument(skip(self, identity))]
    pub async fn create_flight(
        &self,
        identity: Option<&Identity>,
        mut flight: NewFlight,
    ) -> Result<Flight> {
        elevated(identity)?;
        if flight.arrival_time <= flight.departure_time {
            return Err(BookingError::invalid(
                "arrival_time",
                "must be after departure_time",
            ));
        }
        flight.crews.sort_unstable();
        flight.crews.dedup();
        self.store.create_flight(&flight).await
    }

    /// Delete any catalog entity, flight, ticket or order.
    ///
    /// # Errors
    ///
    /// `NotFound` if it does not exist, `Protected` while it is referenced.
    #[tracing::instrument(skip(self, identity))]
    pub async fn delete(&self, identity: Option<&Identity>, target: EntityRef) -> Result<()> {
        elevated(identity)?;
        self.store.delete(target).await?;
        tracing::info!(?target, "Deleted");
        Ok(())
    }
}
