//! The application wiring over the in-memory store

#![allow(clippy::unwrap_used)] // Tests can unwrap

use flight_booking::{seed, App};
use flight_booking_core::{BookingError, EntityKind, FlightFilter, TicketRequest};
use flight_booking_testing::{customer, staff, test_clock, InMemoryBookingStore};
use std::sync::Arc;

fn app() -> App<InMemoryBookingStore> {
    App::new(Arc::new(InMemoryBookingStore::new()), Arc::new(test_clock()))
}

#[tokio::test]
async fn test_seeded_flight_is_bookable() {
    let app = app();
    let flight = seed::sample_flight(&app.catalog, &staff()).await.unwrap();

    let placed = app
        .orders
        .create_order(
            Some(&customer()),
            vec![
                TicketRequest::new(flight.id, 1, 1),
                TicketRequest::new(flight.id, 1, 2),
            ],
        )
        .await
        .unwrap();
    assert_eq!(placed.tickets.len(), 2);

    let listings = app
        .queries
        .list_flights(Some(&customer()), &FlightFilter::default())
        .await
        .unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].tickets_available, 118);
    assert_eq!(listings[0].crew_count, 2);
    assert_eq!(listings[0].duration, "1h 35m");

    let detail = app
        .queries
        .flight_detail(Some(&customer()), flight.id)
        .await
        .unwrap();
    assert_eq!(detail.route.departure_airport, "Boryspil");
    assert_eq!(detail.taken_seats.get(&1), Some(&vec![1, 2]));
}

#[tokio::test]
async fn test_seeding_twice_reports_duplicate() {
    let app = app();
    seed::sample_flight(&app.catalog, &staff()).await.unwrap();

    let err = seed::sample_flight(&app.catalog, &staff())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BookingError::Duplicate {
            entity: EntityKind::Country,
            ..
        }
    ));
}

#[tokio::test]
async fn test_seeding_requires_staff() {
    let app = app();

    let err = seed::sample_flight(&app.catalog, &customer())
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::Forbidden);
}
