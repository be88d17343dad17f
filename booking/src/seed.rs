//! Sample catalog used by the `demo` binary.

use chrono::{DateTime, Duration, TimeZone, Utc};
use flight_booking_core::{
    CatalogService, CatalogStore, Flight, Identity, NewAirplane, NewCrew, NewFlight, NewRoute,
    Result,
};

/// Departure of the seeded flight.
#[must_use]
pub fn departure() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 1, 7, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Create Kyiv and Warsaw airports, a route between them, a 20x6 airplane,
/// two crew members and one flight.
///
/// # Errors
///
/// Fails on the first catalog error, e.g. `Duplicate` when the catalog was
/// already seeded.
pub async fn sample_flight<S: CatalogStore>(
    catalog: &CatalogService<S>,
    staff: &Identity,
) -> Result<Flight> {
    let staff = Some(staff);

    let ukraine = catalog.create_country(staff, "Ukraine").await?;
    let poland = catalog.create_country(staff, "Poland").await?;
    let kyiv = catalog.create_city(staff, "Kyiv", ukraine.id).await?;
    let warsaw = catalog.create_city(staff, "Warsaw", poland.id).await?;
    let boryspil = catalog.create_airport(staff, "Boryspil", kyiv.id).await?;
    let chopin = catalog.create_airport(staff, "Chopin", warsaw.id).await?;

    let route = catalog
        .create_route(
            staff,
            NewRoute {
                source: boryspil.id,
                destination: chopin.id,
                distance: 690,
            },
        )
        .await?;

    let boeing = catalog.create_airplane_type(staff, "Boeing 737").await?;
    let airplane = catalog
        .create_airplane(
            staff,
            NewAirplane {
                name: "UR-PSA".to_string(),
                rows: 20,
                seats_in_row: 6,
                airplane_type: boeing.id,
            },
        )
        .await?;

    let pilot = catalog.create_position(staff, "Pilot").await?;
    let captain = catalog
        .create_crew(
            staff,
            NewCrew {
                first_name: "Olena".to_string(),
                last_name: "Kovalenko".to_string(),
                position: Some(pilot.id),
            },
        )
        .await?;
    let attendant = catalog
        .create_crew(
            staff,
            NewCrew {
                first_name: "Marek".to_string(),
                last_name: "Nowak".to_string(),
                position: None,
            },
        )
        .await?;

    let flight = catalog
        .create_flight(
            staff,
            NewFlight {
                route: route.id,
                airplane: airplane.id,
                departure_time: departure(),
                arrival_time: departure() + Duration::minutes(95),
                crews: vec![captain.id, attendant.id],
            },
        )
        .await?;

    tracing::info!(flight_id = %flight.id, "Sample catalog seeded");
    Ok(flight)
}
