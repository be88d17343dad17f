//! Tests for the in-memory store and fixtures

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use chrono::Utc;
use flight_booking_core::{
    BookingError, BookingQueries, BookingTransaction, CatalogStore, CrewFilter, EntityKind,
    EntityRef, FlightFilter, NewCrew, OrderScope, SeatPosition, TicketRequest, UnitOfWork,
    UserId,
};
use flight_booking_testing::{Fixtures, InMemoryBookingStore, KYIV, LONDON, WARSAW};
use std::sync::Arc;

fn setup() -> (Arc<InMemoryBookingStore>, Fixtures<InMemoryBookingStore>) {
    let store = Arc::new(InMemoryBookingStore::new());
    let fixtures = Fixtures::new(Arc::clone(&store));
    (store, fixtures)
}

#[tokio::test]
async fn test_fixtures_reuse_places() {
    let (store, fixtures) = setup();

    let first = fixtures.route(KYIV, WARSAW).await.unwrap();
    let second = fixtures.route(KYIV, LONDON).await.unwrap();
    let again = fixtures.route(KYIV, WARSAW).await.unwrap();

    assert_eq!(first.source, second.source);
    assert_eq!(first, again);
    assert_eq!(store.routes().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_duplicate_names_are_rejected() {
    let store = InMemoryBookingStore::new();
    store.create_country("Ukraine").await.unwrap();

    let err = store.create_country("Ukraine").await.unwrap_err();
    assert_eq!(
        err,
        BookingError::Duplicate {
            entity: EntityKind::Country,
            value: "name Ukraine".to_string(),
        }
    );
}

#[tokio::test]
async fn test_dangling_reference_is_not_found() {
    let store = InMemoryBookingStore::new();
    let err = store
        .create_city("Kyiv", flight_booking_core::CountryId::new(42))
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::not_found(EntityKind::Country, 42));
}

#[tokio::test]
async fn test_referenced_airport_is_protected() {
    let (store, fixtures) = setup();
    let route = fixtures.route(KYIV, WARSAW).await.unwrap();

    let err = store
        .delete(EntityRef::Airport(route.source))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BookingError::Protected {
            entity: EntityKind::Airport,
            ..
        }
    ));

    store.delete(EntityRef::Route(route.id)).await.unwrap();
    store.delete(EntityRef::Airport(route.source)).await.unwrap();
}

#[tokio::test]
async fn test_deleting_position_clears_crew() {
    let (store, fixtures) = setup();
    let pilot = fixtures.crew(Some("Pilot")).await.unwrap();

    store
        .delete(EntityRef::Position(pilot.position.unwrap()))
        .await
        .unwrap();

    let crews = store.crews(&CrewFilter::default()).await.unwrap();
    assert_eq!(crews.len(), 1);
    assert_eq!(crews[0].position, None);
}

#[tokio::test]
async fn test_deleting_crew_removes_it_from_flights() {
    let (store, fixtures) = setup();
    let flight = fixtures.sample_flight().await.unwrap();

    store
        .delete(EntityRef::Crew(flight.crews[0]))
        .await
        .unwrap();

    let snapshot = store.flight(flight.id).await.unwrap().unwrap();
    assert!(snapshot.flight.crews.is_empty());
}

#[tokio::test]
async fn test_rollback_discards_writes() {
    let (store, fixtures) = setup();
    let flight = fixtures.sample_flight().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let order = tx.insert_order(UserId::new(1), Utc::now()).await.unwrap();
    tx.insert_ticket(order.id, TicketRequest::new(flight.id, 1, 1))
        .await
        .unwrap();
    assert!(tx.is_seat_taken(flight.id, SeatPosition::new(1, 1)).await.unwrap());
    tx.rollback().await.unwrap();

    assert_eq!(store.order_count().unwrap(), 0);
    assert_eq!(store.ticket_count().unwrap(), 0);
}

#[tokio::test]
async fn test_dropped_transaction_releases_gate() {
    let (store, fixtures) = setup();
    let flight = fixtures.sample_flight().await.unwrap();

    {
        let mut tx = store.begin().await.unwrap();
        tx.insert_order(UserId::new(1), Utc::now()).await.unwrap();
    }

    let mut tx = store.begin().await.unwrap();
    assert!(tx.lock_flight(flight.id).await.unwrap().is_some());
    tx.commit().await.unwrap();
    assert_eq!(store.order_count().unwrap(), 0);
}

#[tokio::test]
async fn test_commit_publishes_and_cascades_on_order_delete() {
    let (store, fixtures) = setup();
    let flight = fixtures.sample_flight().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let order = tx.insert_order(UserId::new(1), Utc::now()).await.unwrap();
    tx.insert_ticket(order.id, TicketRequest::new(flight.id, 2, 3))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(store.ticket_count().unwrap(), 1);
    let orders = store.orders(OrderScope::All).await.unwrap();
    assert_eq!(orders[0].tickets[0].source, "Kyiv Airport");

    store.delete(EntityRef::Order(order.id)).await.unwrap();
    assert_eq!(store.ticket_count().unwrap(), 0);
}

#[tokio::test]
async fn test_unique_seat_enforced_at_insert() {
    let (store, fixtures) = setup();
    let flight = fixtures.sample_flight().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let order = tx.insert_order(UserId::new(1), Utc::now()).await.unwrap();
    let request = TicketRequest::new(flight.id, 1, 1);
    tx.insert_ticket(order.id, request).await.unwrap();
    let err = tx.insert_ticket(order.id, request).await.unwrap_err();
    assert!(matches!(err, BookingError::SeatTaken { row: 1, seat: 1, .. }));
}

#[tokio::test]
async fn test_flight_snapshot_joins_names() {
    let (store, fixtures) = setup();
    let flight = fixtures.sample_flight().await.unwrap();
    store
        .create_crew(&NewCrew {
            first_name: "Unassigned".into(),
            last_name: "Crew".into(),
            position: None,
        })
        .await
        .unwrap();

    let flights = store.flights(&FlightFilter::default()).await.unwrap();
    assert_eq!(flights.len(), 1);
    let snapshot = &flights[0];
    assert_eq!(snapshot.flight.id, flight.id);
    assert_eq!(snapshot.route.departure_city, "Kyiv");
    assert_eq!(snapshot.route.arrival_country, "Poland");
    assert_eq!(snapshot.airplane.airplane_type, "Boeing 737");
    assert_eq!(snapshot.crews[0].position.as_deref(), Some("Pilot"));
}
