//! Derived display fields, computed from entity data alone.

use crate::types::CrewId;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Flight duration as `"{hours}h {minutes}m"`.
///
/// Total minutes are floored; hours and minutes use Euclidean division, so a
/// negative span of 30 minutes renders as `"-1h 30m"`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use flight_booking_core::derived::flight_duration;
///
/// let departure = Utc.with_ymd_and_hms(2025, 12, 1, 7, 0, 0).unwrap();
/// let arrival = Utc.with_ymd_and_hms(2025, 12, 2, 8, 30, 59).unwrap();
/// assert_eq!(flight_duration(departure, arrival), "25h 30m");
/// ```
#[must_use]
pub fn flight_duration(departure: DateTime<Utc>, arrival: DateTime<Utc>) -> String {
    let total_minutes = (arrival - departure).num_seconds().div_euclid(60);
    let hours = total_minutes.div_euclid(60);
    let minutes = total_minutes.rem_euclid(60);
    format!("{hours}h {minutes}m")
}

/// Route description, e.g. `"Kyiv Airport -> Warsaw Airport. Distance 500km"`.
#[must_use]
pub fn route_description(source: &str, destination: &str, distance: i32) -> String {
    format!("{source} -> {destination}. Distance {distance}km")
}

/// Number of distinct crew members.
#[must_use]
pub fn crew_count(crews: &[CrewId]) -> usize {
    crews.iter().collect::<BTreeSet<_>>().len()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_duration_floors_partial_minutes() {
        let departure = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        let arrival = Utc.with_ymd_and_hms(2025, 1, 1, 11, 5, 59).unwrap();
        assert_eq!(flight_duration(departure, arrival), "1h 5m");
    }

    #[test]
    fn test_negative_duration() {
        let departure = Utc.with_ymd_and_hms(2025, 1, 1, 10, 30, 0).unwrap();
        let arrival = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(flight_duration(departure, arrival), "-1h 30m");
    }

    #[test]
    fn test_route_description() {
        assert_eq!(
            route_description("Kyiv Airport", "Warsaw Airport", 500),
            "Kyiv Airport -> Warsaw Airport. Distance 500km"
        );
    }

    #[test]
    fn test_crew_count_ignores_duplicates() {
        let crews = [CrewId::new(2), CrewId::new(1), CrewId::new(2)];
        assert_eq!(crew_count(&crews), 2);
        assert_eq!(crew_count(&[]), 0);
    }
}
