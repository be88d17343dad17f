//! Optional, AND-combined read filters.
//!
//! Field names match the query parameters of the original API so the
//! presentation layer can deserialize them directly. An absent field places no
//! restriction on its dimension. Text filters are case-insensitive substring
//! matches; date filters compare the calendar day in UTC.

use crate::views::{CrewListing, FlightSnapshot, TicketListing};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Case-insensitive substring match.
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn text_matches(filter: Option<&str>, value: &str) -> bool {
    filter.is_none_or(|needle| contains_ignore_case(value, needle))
}

fn date_matches(filter: Option<NaiveDate>, value: DateTime<Utc>) -> bool {
    filter.is_none_or(|day| value.date_naive() == day)
}

/// Flight list filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightFilter {
    /// Source city name contains
    pub departure_city: Option<String>,
    /// Destination city name contains
    pub arrival_city: Option<String>,
    /// Departs on this day
    pub departure_date: Option<NaiveDate>,
    /// Arrives on this day
    pub arrival_date: Option<NaiveDate>,
}

impl FlightFilter {
    /// Whether `snapshot` passes every supplied filter.
    #[must_use]
    pub fn matches(&self, snapshot: &FlightSnapshot) -> bool {
        text_matches(self.departure_city.as_deref(), &snapshot.route.departure_city)
            && text_matches(self.arrival_city.as_deref(), &snapshot.route.arrival_city)
            && date_matches(self.departure_date, snapshot.flight.departure_time)
            && date_matches(self.arrival_date, snapshot.flight.arrival_time)
    }
}

/// Crew list filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrewFilter {
    /// Position name contains
    pub position: Option<String>,
}

impl CrewFilter {
    /// Whether `crew` passes the filter. Crew without a position never match
    /// a position filter.
    #[must_use]
    pub fn matches(&self, crew: &CrewListing) -> bool {
        match (self.position.as_deref(), crew.position.as_deref()) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(needle), Some(position)) => contains_ignore_case(position, needle),
        }
    }
}

/// Ticket list filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketFilter {
    /// Source airport name contains
    pub source: Option<String>,
    /// Destination airport name contains
    pub destination: Option<String>,
}

impl TicketFilter {
    /// Whether `ticket` passes every supplied filter.
    #[must_use]
    pub fn matches(&self, ticket: &TicketListing) -> bool {
        text_matches(self.source.as_deref(), &ticket.source)
            && text_matches(self.destination.as_deref(), &ticket.destination)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{
        AirplaneId, CrewId, Flight, FlightId, OrderId, RouteId, TicketId,
    };
    use crate::views::{AirplaneListing, RouteListing};
    use chrono::TimeZone;

    fn snapshot(from: &str, to: &str, departure: DateTime<Utc>) -> FlightSnapshot {
        FlightSnapshot {
            flight: Flight {
                id: FlightId::new(1),
                route: RouteId::new(1),
                airplane: AirplaneId::new(1),
                departure_time: departure,
                arrival_time: departure + chrono::Duration::hours(25),
                crews: vec![],
            },
            route: RouteListing {
                id: RouteId::new(1),
                departure_airport: format!("{from} Airport"),
                arrival_airport: format!("{to} Airport"),
                departure_country: "Ukraine".to_string(),
                departure_city: from.to_string(),
                arrival_country: "Poland".to_string(),
                arrival_city: to.to_string(),
                distance: 500,
            },
            airplane: AirplaneListing {
                id: AirplaneId::new(1),
                name: "Boeing".to_string(),
                rows: 20,
                seats_in_row: 6,
                airplane_type: "Boeing 737".to_string(),
            },
            crews: vec![],
            seats: vec![],
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let departure = Utc.with_ymd_and_hms(2025, 12, 1, 7, 0, 0).unwrap();
        assert!(FlightFilter::default().matches(&snapshot("Kyiv", "Warsaw", departure)));
        assert!(CrewFilter::default().matches(&CrewListing {
            id: CrewId::new(1),
            first_name: "a".into(),
            last_name: "b".into(),
            position: None,
        }));
    }

    #[test]
    fn test_city_filter_is_case_insensitive_substring() {
        let departure = Utc.with_ymd_and_hms(2025, 12, 1, 7, 0, 0).unwrap();
        let flight = snapshot("Kyiv", "London", departure);

        let filter = FlightFilter {
            departure_city: Some("kyi".to_string()),
            ..FlightFilter::default()
        };
        assert!(filter.matches(&flight));

        let filter = FlightFilter {
            departure_city: Some("Lviv".to_string()),
            ..FlightFilter::default()
        };
        assert!(!filter.matches(&flight));
    }

    #[test]
    fn test_date_filter_matches_calendar_day() {
        let departure = Utc.with_ymd_and_hms(2020, 12, 1, 23, 59, 0).unwrap();
        let flight = snapshot("Kyiv", "Warsaw", departure);

        let filter = FlightFilter {
            departure_date: NaiveDate::from_ymd_opt(2020, 12, 1),
            ..FlightFilter::default()
        };
        assert!(filter.matches(&flight));

        let filter = FlightFilter {
            arrival_date: NaiveDate::from_ymd_opt(2020, 12, 3),
            ..FlightFilter::default()
        };
        assert!(filter.matches(&flight));

        let filter = FlightFilter {
            departure_date: NaiveDate::from_ymd_opt(2020, 12, 2),
            ..FlightFilter::default()
        };
        assert!(!filter.matches(&flight));
    }

    #[test]
    fn test_filters_combine_with_and() {
        let departure = Utc.with_ymd_and_hms(2025, 3, 1, 7, 0, 0).unwrap();
        let flight = snapshot("Kyiv", "Berlin", departure);

        let filter = FlightFilter {
            departure_city: Some("Kyiv".to_string()),
            arrival_city: Some("London".to_string()),
            ..FlightFilter::default()
        };
        assert!(!filter.matches(&flight));
    }

    #[test]
    fn test_crew_position_filter() {
        let pilot = CrewListing {
            id: CrewId::new(1),
            first_name: "Olena".into(),
            last_name: "K".into(),
            position: Some("Pilot".into()),
        };
        let unassigned = CrewListing {
            position: None,
            ..pilot.clone()
        };
        let filter = CrewFilter {
            position: Some("pilot".into()),
        };
        assert!(filter.matches(&pilot));
        assert!(!filter.matches(&unassigned));
    }

    #[test]
    fn test_ticket_filter_by_airport_name() {
        let ticket = TicketListing {
            id: TicketId::new(1),
            row: 1,
            seat: 1,
            flight: FlightId::new(1),
            source: "Kyiv Airport".into(),
            destination: "London Airport".into(),
            order: OrderId::new(1),
        };
        assert!(TicketFilter {
            source: Some("Kyiv".into()),
            destination: None,
        }
        .matches(&ticket));
        assert!(!TicketFilter {
            source: None,
            destination: Some("Berlin".into()),
        }
        .matches(&ticket));
    }

    #[test]
    fn test_filter_deserializes_query_parameter_names() {
        let filter: FlightFilter = serde_json::from_value(serde_json::json!({
            "departure_city": "Kyiv",
            "departure_date": "2020-12-01",
        }))
        .unwrap();
        assert_eq!(filter.departure_city.as_deref(), Some("Kyiv"));
        assert_eq!(filter.departure_date, NaiveDate::from_ymd_opt(2020, 12, 1));
        assert!(filter.arrival_city.is_none());
    }
}
