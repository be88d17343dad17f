//! Catalog maintenance against the in-memory store

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use chrono::Duration;
use flight_booking_core::{
    BookingError, CatalogService, EntityKind, EntityRef, NewAirplane, NewFlight, NewRoute,
    OrderService, TicketRequest,
};
use flight_booking_testing::fixtures::sample_departure;
use flight_booking_testing::{
    customer, staff, test_clock, Fixtures, InMemoryBookingStore, KYIV, WARSAW,
};
use std::sync::Arc;

fn setup() -> (
    Arc<InMemoryBookingStore>,
    CatalogService<InMemoryBookingStore>,
    Fixtures<InMemoryBookingStore>,
) {
    let store = Arc::new(InMemoryBookingStore::new());
    let catalog = CatalogService::new(Arc::clone(&store));
    let fixtures = Fixtures::new(Arc::clone(&store));
    (store, catalog, fixtures)
}

#[tokio::test]
async fn test_writes_require_staff() {
    let (_, catalog, _) = setup();

    assert_eq!(
        catalog
            .create_country(Some(&customer()), "Ukraine")
            .await
            .unwrap_err(),
        BookingError::Forbidden
    );
    assert_eq!(
        catalog.create_country(None, "Ukraine").await.unwrap_err(),
        BookingError::Unauthorized
    );

    let country = catalog
        .create_country(Some(&staff()), "Ukraine")
        .await
        .unwrap();
    assert_eq!(country.name, "Ukraine");
}

#[tokio::test]
async fn test_blank_name_is_invalid() {
    let (_, catalog, _) = setup();
    let err = catalog
        .create_position(Some(&staff()), "  ")
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidField { field: "name", .. }));
}

#[tokio::test]
async fn test_airplane_grid_must_be_positive() {
    let (_, catalog, fixtures) = setup();
    let airplane_type = fixtures.airplane_type("Airbus A320").await.unwrap();

    let err = catalog
        .create_airplane(
            Some(&staff()),
            NewAirplane {
                name: "Mriya".to_string(),
                rows: 0,
                seats_in_row: 6,
                airplane_type,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidField { field: "rows", .. }));
}

#[tokio::test]
async fn test_route_distance_and_uniqueness() {
    let (_, catalog, fixtures) = setup();
    let source = fixtures.airport(KYIV).await.unwrap();
    let destination = fixtures.airport(WARSAW).await.unwrap();

    let err = catalog
        .create_route(
            Some(&staff()),
            NewRoute {
                source,
                destination,
                distance: 0,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidField { field: "distance", .. }));

    let route = NewRoute {
        source,
        destination,
        distance: 690,
    };
    catalog
        .create_route(Some(&staff()), route.clone())
        .await
        .unwrap();
    let err = catalog
        .create_route(Some(&staff()), route)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BookingError::Duplicate {
            entity: EntityKind::Route,
            ..
        }
    ));
}

#[tokio::test]
async fn test_flight_must_arrive_after_departure() {
    let (_, catalog, fixtures) = setup();
    let route = fixtures.route(KYIV, WARSAW).await.unwrap();
    let airplane = fixtures.airplane(20, 6).await.unwrap();

    let flight = |arrival_offset: Duration| NewFlight {
        route: route.id,
        airplane: airplane.id,
        departure_time: sample_departure(),
        arrival_time: sample_departure() + arrival_offset,
        crews: vec![],
    };

    for offset in [Duration::zero(), Duration::minutes(-30)] {
        let err = catalog
            .create_flight(Some(&staff()), flight(offset))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BookingError::InvalidField {
                field: "arrival_time",
                ..
            }
        ));
    }

    let created = catalog
        .create_flight(Some(&staff()), flight(Duration::hours(2)))
        .await
        .unwrap();
    assert_eq!(created.arrival_time - created.departure_time, Duration::hours(2));
}

#[tokio::test]
async fn test_flight_with_unknown_crew() {
    let (_, catalog, fixtures) = setup();
    let route = fixtures.route(KYIV, WARSAW).await.unwrap();
    let airplane = fixtures.airplane(20, 6).await.unwrap();

    let err = catalog
        .create_flight(
            Some(&staff()),
            NewFlight {
                route: route.id,
                airplane: airplane.id,
                departure_time: sample_departure(),
                arrival_time: sample_departure() + Duration::hours(1),
                crews: vec![flight_booking_core::CrewId::new(404)],
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::not_found(EntityKind::Crew, 404));
}

#[tokio::test]
async fn test_protect_on_delete() {
    let (_, catalog, fixtures) = setup();
    let flight = fixtures.sample_flight().await.unwrap();

    for target in [
        EntityRef::Airplane(flight.airplane),
        EntityRef::Route(flight.route),
    ] {
        let err = catalog.delete(Some(&staff()), target).await.unwrap_err();
        assert!(matches!(err, BookingError::Protected { .. }), "{target:?}");
    }

    let route = fixtures.route(KYIV, WARSAW).await.unwrap();
    let err = catalog
        .delete(Some(&staff()), EntityRef::Airport(route.source))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        BookingError::Protected {
            entity: EntityKind::Airport,
            id: route.source.get()
        }
    );
}

#[tokio::test]
async fn test_deleting_flight_cascades_tickets() {
    let (store, catalog, fixtures) = setup();
    let flight = fixtures.sample_flight().await.unwrap();
    OrderService::new(Arc::clone(&store), Arc::new(test_clock()))
        .create_order(Some(&customer()), vec![TicketRequest::new(flight.id, 1, 1)])
        .await
        .unwrap();

    assert_eq!(
        catalog
            .delete(Some(&customer()), EntityRef::Flight(flight.id))
            .await
            .unwrap_err(),
        BookingError::Forbidden
    );

    catalog
        .delete(Some(&staff()), EntityRef::Flight(flight.id))
        .await
        .unwrap();
    assert_eq!(store.ticket_count().unwrap(), 0);
    assert_eq!(store.order_count().unwrap(), 1);

    catalog
        .delete(Some(&staff()), EntityRef::Route(flight.route))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_unknown_entity() {
    let (_, catalog, _) = setup();
    let err = catalog
        .delete(
            Some(&staff()),
            EntityRef::Order(flight_booking_core::OrderId::new(5)),
        )
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::not_found(EntityKind::Order, 5));
}
