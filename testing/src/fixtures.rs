//! Catalog fixtures.
//!
//! Builds the reference data a test needs through any [`CatalogStore`], so
//! the same fixtures drive the in-memory store and the Postgres adapter.
//! Places, routes, airplane types and positions are cached by name, so
//! asking for `KYIV` twice reuses the same rows.

use chrono::{DateTime, Duration, TimeZone, Utc};
use flight_booking_core::{
    Airplane, AirplaneTypeId, AirportId, BookingError, CatalogStore, CityId, CountryId, Crew,
    CrewId, Flight, NewAirplane, NewCrew, NewFlight, NewRoute, PositionId, Result, Route, RouteId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// A city and the country it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Place {
    /// City name
    pub city: &'static str,
    /// Country name
    pub country: &'static str,
}

impl Place {
    /// Creates a new `Place`
    #[must_use]
    pub const fn new(city: &'static str, country: &'static str) -> Self {
        Self { city, country }
    }

    /// Name of the airport serving this city.
    #[must_use]
    pub fn airport(&self) -> String {
        format!("{} Airport", self.city)
    }
}

/// Kyiv, Ukraine
pub const KYIV: Place = Place::new("Kyiv", "Ukraine");
/// Warsaw, Poland
pub const WARSAW: Place = Place::new("Warsaw", "Poland");
/// London, United Kingdom
pub const LONDON: Place = Place::new("London", "United Kingdom");
/// Berlin, Germany
pub const BERLIN: Place = Place::new("Berlin", "Germany");

/// Departure of [`Fixtures::sample_flight`]: 2025-12-01 07:00 UTC.
#[must_use]
pub fn sample_departure() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 1, 7, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[derive(Default)]
struct Cache {
    countries: HashMap<&'static str, CountryId>,
    cities: HashMap<&'static str, CityId>,
    airports: HashMap<&'static str, AirportId>,
    routes: HashMap<(&'static str, &'static str), Route>,
    airplane_types: HashMap<String, AirplaneTypeId>,
    positions: HashMap<String, PositionId>,
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> BookingError {
    BookingError::Storage("fixture cache lock poisoned".to_string())
}

/// Fixture builder over a catalog store.
pub struct Fixtures<S> {
    store: Arc<S>,
    serial: AtomicU32,
    cache: Mutex<Cache>,
}

impl<S: CatalogStore> Fixtures<S> {
    /// Creates fixtures writing to `store`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            serial: AtomicU32::new(1),
            cache: Mutex::new(Cache::default()),
        }
    }

    fn next_serial(&self) -> u32 {
        self.serial.fetch_add(1, Ordering::Relaxed)
    }

    fn cached<V>(&self, pick: impl FnOnce(&Cache) -> Option<V>) -> Result<Option<V>> {
        let cache = self.cache.lock().map_err(poisoned)?;
        Ok(pick(&cache))
    }

    fn remember(&self, put: impl FnOnce(&mut Cache)) -> Result<()> {
        let mut cache = self.cache.lock().map_err(poisoned)?;
        put(&mut cache);
        Ok(())
    }

    /// Country of `place`, created on first use.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn country(&self, place: Place) -> Result<CountryId> {
        if let Some(id) = self.cached(|c| c.countries.get(place.country).copied())? {
            return Ok(id);
        }
        let id = self.store.create_country(place.country).await?.id;
        self.remember(|c| {
            c.countries.insert(place.country, id);
        })?;
        Ok(id)
    }

    /// City of `place`, created on first use.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn city(&self, place: Place) -> Result<CityId> {
        if let Some(id) = self.cached(|c| c.cities.get(place.city).copied())? {
            return Ok(id);
        }
        let country = self.country(place).await?;
        let id = self.store.create_city(place.city, country).await?.id;
        self.remember(|c| {
            c.cities.insert(place.city, id);
        })?;
        Ok(id)
    }

    /// `"{city} Airport"`, created on first use.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn airport(&self, place: Place) -> Result<AirportId> {
        if let Some(id) = self.cached(|c| c.airports.get(place.city).copied())? {
            return Ok(id);
        }
        let city = self.city(place).await?;
        let id = self.store.create_airport(&place.airport(), city).await?.id;
        self.remember(|c| {
            c.airports.insert(place.city, id);
        })?;
        Ok(id)
    }

    /// A 500 km route between the airports of `from` and `to`, created on
    /// first use.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn route(&self, from: Place, to: Place) -> Result<Route> {
        let key = (from.city, to.city);
        if let Some(route) = self.cached(|c| c.routes.get(&key).cloned())? {
            return Ok(route);
        }
        let source = self.airport(from).await?;
        let destination = self.airport(to).await?;
        let route = self
            .store
            .create_route(&NewRoute {
                source,
                destination,
                distance: 500,
            })
            .await?;
        self.remember(|c| {
            c.routes.insert(key, route.clone());
        })?;
        Ok(route)
    }

    /// Airplane type by name, created on first use.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn airplane_type(&self, name: &str) -> Result<AirplaneTypeId> {
        if let Some(id) = self.cached(|c| c.airplane_types.get(name).copied())? {
            return Ok(id);
        }
        let id = self.store.create_airplane_type(name).await?.id;
        self.remember(|c| {
            c.airplane_types.insert(name.to_string(), id);
        })?;
        Ok(id)
    }

    /// A uniquely named `Boeing 737` with the given grid.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn airplane(&self, rows: i32, seats_in_row: i32) -> Result<Airplane> {
        let airplane_type = self.airplane_type("Boeing 737").await?;
        self.store
            .create_airplane(&NewAirplane {
                name: format!("Boeing {}", self.next_serial()),
                rows,
                seats_in_row,
                airplane_type,
            })
            .await
    }

    /// Crew position by name, created on first use.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn position(&self, name: &str) -> Result<PositionId> {
        if let Some(id) = self.cached(|c| c.positions.get(name).copied())? {
            return Ok(id);
        }
        let id = self.store.create_position(name).await?.id;
        self.remember(|c| {
            c.positions.insert(name.to_string(), id);
        })?;
        Ok(id)
    }

    /// A uniquely named crew member, optionally holding `position`.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn crew(&self, position: Option<&str>) -> Result<Crew> {
        let position = match position {
            Some(name) => Some(self.position(name).await?),
            None => None,
        };
        self.store
            .create_crew(&NewCrew {
                first_name: format!("Crew{}", self.next_serial()),
                last_name: "Member".to_string(),
                position,
            })
            .await
    }

    /// A flight on `route` with `airplane`, lasting 2h 30m.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn flight(
        &self,
        route: RouteId,
        airplane: &Airplane,
        departure_time: DateTime<Utc>,
        crews: Vec<CrewId>,
    ) -> Result<Flight> {
        self.store
            .create_flight(&NewFlight {
                route,
                airplane: airplane.id,
                departure_time,
                arrival_time: departure_time + Duration::minutes(150),
                crews,
            })
            .await
    }

    /// Kyiv to Warsaw on a 20 × 6 airplane with one pilot, departing at
    /// [`sample_departure`].
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn sample_flight(&self) -> Result<Flight> {
        let route = self.route(KYIV, WARSAW).await?;
        let airplane = self.airplane(20, 6).await?;
        let pilot = self.crew(Some("Pilot")).await?;
        self.flight(route.id, &airplane, sample_departure(), vec![pilot.id])
            .await
    }
}
