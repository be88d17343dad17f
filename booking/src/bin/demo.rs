//! Seed a catalog, book a few seats and print the read models.
//!
//! Run against an empty database; a second run reuses the first flight.

use flight_booking::{seed, telemetry, App, Config};
use flight_booking_core::{FlightFilter, Identity, TicketRequest, UserId};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    telemetry::init(&config.log_filter);

    let app = App::connect(&config).await?;
    let staff = Identity::staff(UserId::new(100));
    let customer = Identity::customer(UserId::new(1));

    let existing = app
        .queries
        .list_flights(Some(&staff), &FlightFilter::default())
        .await?;
    let flight = match existing.first() {
        Some(listing) => listing.id,
        None => seed::sample_flight(&app.catalog, &staff).await?.id,
    };

    let wanted: Vec<TicketRequest> = (1..=3)
        .map(|seat| TicketRequest::new(flight, 1, seat))
        .collect();
    match app.orders.create_order(Some(&customer), wanted).await {
        Ok(placed) => println!("{}", serde_json::to_string_pretty(&placed)?),
        Err(e) => tracing::warn!(error = %e, "Order rejected"),
    }

    let listings = app
        .queries
        .list_flights(Some(&customer), &FlightFilter::default())
        .await?;
    println!("{}", serde_json::to_string_pretty(&listings)?);

    let detail = app.queries.flight_detail(Some(&customer), flight).await?;
    println!("{}", serde_json::to_string_pretty(&detail)?);

    let orders = app.queries.orders(Some(&customer)).await?;
    println!("{}", serde_json::to_string_pretty(&orders)?);

    Ok(())
}
