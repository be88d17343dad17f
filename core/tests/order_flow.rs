//! Order creation against the in-memory store

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use flight_booking_core::{
    BookingError, BookingQueries, Clock, Flight, FlightFilter, FlightId, Identity, OrderService,
    QueryService, SeatField, TicketRequest, UserId,
};
use flight_booking_testing::properties::{seat_outside, seat_within};
use flight_booking_testing::{
    customer, init_test_tracing, test_clock, Fixtures, InMemoryBookingStore,
};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

struct Harness {
    store: Arc<InMemoryBookingStore>,
    orders: OrderService<InMemoryBookingStore>,
    fixtures: Fixtures<InMemoryBookingStore>,
}

impl Harness {
    fn new() -> Self {
        init_test_tracing();
        let store = Arc::new(InMemoryBookingStore::new());
        Self {
            orders: OrderService::new(Arc::clone(&store), Arc::new(test_clock())),
            fixtures: Fixtures::new(Arc::clone(&store)),
            store,
        }
    }

    async fn tickets_available(&self, flight: FlightId) -> i64 {
        let snapshot = self.store.flight(flight).await.unwrap().unwrap();
        snapshot.availability().tickets_available
    }
}

fn ticket(flight: &Flight, row: i32, seat: i32) -> TicketRequest {
    TicketRequest::new(flight.id, row, seat)
}

#[tokio::test]
async fn test_order_creates_all_tickets() {
    let harness = Harness::new();
    let flight = harness.fixtures.sample_flight().await.unwrap();

    let placed = harness
        .orders
        .create_order(
            Some(&customer()),
            vec![ticket(&flight, 1, 1), ticket(&flight, 1, 2)],
        )
        .await
        .unwrap();

    assert_eq!(placed.order.user, customer().user);
    assert_eq!(placed.order.created_at, test_clock().now());
    assert_eq!(placed.tickets.len(), 2);
    assert_eq!(placed.tickets[0].seat, 1);
    assert_eq!(placed.tickets[1].seat, 2);
    assert!(placed.tickets.iter().all(|t| t.order == placed.order.id));
    assert_eq!(harness.store.ticket_count().unwrap(), 2);
}

#[tokio::test]
async fn test_out_of_range_ticket_aborts_whole_order() {
    let harness = Harness::new();
    let flight = harness.fixtures.sample_flight().await.unwrap();

    let err = harness
        .orders
        .create_order(
            Some(&customer()),
            vec![ticket(&flight, 1, 1), ticket(&flight, 1, 10000)],
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BookingError::OutOfRange {
            field: SeatField::Seat,
            value: 10000,
            max: 6
        }
    );
    assert_eq!(harness.store.order_count().unwrap(), 0);
    assert_eq!(harness.store.ticket_count().unwrap(), 0);
    assert!(harness.store.taken_seats(flight.id).unwrap().is_empty());
}

#[tokio::test]
async fn test_row_out_of_range() {
    let harness = Harness::new();
    let flight = harness.fixtures.sample_flight().await.unwrap();

    for row in [0, 21] {
        let err = harness
            .orders
            .create_order(Some(&customer()), vec![ticket(&flight, row, 1)])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BookingError::OutOfRange {
                field: SeatField::Row,
                value: row,
                max: 20
            }
        );
    }
}

#[tokio::test]
async fn test_empty_order_is_rejected() {
    let harness = Harness::new();

    let err = harness
        .orders
        .create_order(Some(&customer()), vec![])
        .await
        .unwrap_err();

    assert_eq!(err, BookingError::EmptyOrder);
    assert_eq!(harness.store.order_count().unwrap(), 0);
}

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let harness = Harness::new();
    let flight = harness.fixtures.sample_flight().await.unwrap();

    let err = harness
        .orders
        .create_order(None, vec![ticket(&flight, 1, 1)])
        .await
        .unwrap_err();

    assert_eq!(err, BookingError::Unauthorized);
}

#[tokio::test]
async fn test_duplicate_seat_in_one_batch() {
    let harness = Harness::new();
    let flight = harness.fixtures.sample_flight().await.unwrap();

    let err = harness
        .orders
        .create_order(
            Some(&customer()),
            vec![ticket(&flight, 4, 2), ticket(&flight, 4, 2)],
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BookingError::SeatTaken {
            flight: flight.id,
            row: 4,
            seat: 2
        }
    );
    assert_eq!(harness.store.ticket_count().unwrap(), 0);
}

#[tokio::test]
async fn test_seat_sold_by_earlier_order() {
    let harness = Harness::new();
    let flight = harness.fixtures.sample_flight().await.unwrap();

    harness
        .orders
        .create_order(Some(&customer()), vec![ticket(&flight, 1, 1)])
        .await
        .unwrap();

    let other = Identity::customer(UserId::new(2));
    let err = harness
        .orders
        .create_order(Some(&other), vec![ticket(&flight, 1, 2), ticket(&flight, 1, 1)])
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::SeatTaken { row: 1, seat: 1, .. }));
    assert_eq!(harness.store.ticket_count().unwrap(), 1);
}

#[tokio::test]
async fn test_unknown_flight_is_not_found() {
    let harness = Harness::new();
    let flight = harness.fixtures.sample_flight().await.unwrap();

    let err = harness
        .orders
        .create_order(
            Some(&customer()),
            vec![ticket(&flight, 1, 1), TicketRequest::new(FlightId::new(999), 1, 1)],
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BookingError::not_found(flight_booking_core::EntityKind::Flight, 999)
    );
    assert_eq!(harness.store.ticket_count().unwrap(), 0);
}

#[tokio::test]
async fn test_first_failing_ticket_is_reported() {
    let harness = Harness::new();
    let flight = harness.fixtures.sample_flight().await.unwrap();

    let err = harness
        .orders
        .create_order(
            Some(&customer()),
            vec![ticket(&flight, 30, 1), ticket(&flight, 1, 9)],
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BookingError::OutOfRange {
            field: SeatField::Row,
            value: 30,
            ..
        }
    ));
}

#[tokio::test]
async fn test_order_spanning_two_flights() {
    let harness = Harness::new();
    let first = harness.fixtures.sample_flight().await.unwrap();
    let second = harness.fixtures.sample_flight().await.unwrap();

    let placed = harness
        .orders
        .create_order(
            Some(&customer()),
            vec![ticket(&second, 1, 1), ticket(&first, 1, 1)],
        )
        .await
        .unwrap();

    assert_eq!(placed.tickets[0].flight, second.id);
    assert_eq!(placed.tickets[1].flight, first.id);
}

#[tokio::test]
async fn test_availability_recomputed_after_each_order() {
    let harness = Harness::new();
    let flight = harness.fixtures.sample_flight().await.unwrap();
    assert_eq!(harness.tickets_available(flight.id).await, 120);

    harness
        .orders
        .create_order(
            Some(&customer()),
            vec![ticket(&flight, 1, 1), ticket(&flight, 2, 1)],
        )
        .await
        .unwrap();
    assert_eq!(harness.tickets_available(flight.id).await, 118);

    harness
        .orders
        .create_order(Some(&customer()), vec![ticket(&flight, 20, 6)])
        .await
        .unwrap();
    assert_eq!(harness.tickets_available(flight.id).await, 117);

    let queries = QueryService::new(Arc::clone(&harness.store));
    let listing = queries
        .list_flights(Some(&customer()), &FlightFilter::default())
        .await
        .unwrap();
    assert_eq!(listing[0].tickets_available, 117);
}

#[tokio::test]
async fn test_taken_seats_grouped_and_sorted() {
    let harness = Harness::new();
    let flight = harness.fixtures.sample_flight().await.unwrap();

    harness
        .orders
        .create_order(
            Some(&customer()),
            vec![ticket(&flight, 1, 3), ticket(&flight, 1, 1), ticket(&flight, 2, 5)],
        )
        .await
        .unwrap();

    let expected: BTreeMap<i32, Vec<i32>> = [(1, vec![1, 3]), (2, vec![5])].into_iter().collect();
    assert_eq!(harness.store.taken_seats(flight.id).unwrap(), expected);
}

#[tokio::test]
async fn test_commit_failure_persists_nothing() {
    let harness = Harness::new();
    let flight = harness.fixtures.sample_flight().await.unwrap();
    harness.store.fail_commits(true);

    let err = harness
        .orders
        .create_order(Some(&customer()), vec![ticket(&flight, 1, 1)])
        .await
        .unwrap_err();

    assert!(!err.is_client_error());
    assert_eq!(harness.store.ticket_count().unwrap(), 0);

    harness.store.fail_commits(false);
    harness
        .orders
        .create_order(Some(&customer()), vec![ticket(&flight, 1, 1)])
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_orders_for_same_seat() {
    let harness = Harness::new();
    let flight = harness.fixtures.sample_flight().await.unwrap();
    let orders = Arc::new(harness.orders.clone());

    let mut handles = Vec::new();
    for user in 1..=8 {
        let orders = Arc::clone(&orders);
        let request = ticket(&flight, 5, 5);
        handles.push(tokio::spawn(async move {
            let identity = Identity::customer(UserId::new(user));
            orders.create_order(Some(&identity), vec![request]).await
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    let succeeded = results.iter().filter(|result| result.is_ok()).count();
    let taken = results
        .iter()
        .filter(|result| matches!(result, Err(BookingError::SeatTaken { row: 5, seat: 5, .. })))
        .count();
    assert_eq!(succeeded, 1);
    assert_eq!(taken, 7);
    assert_eq!(harness.store.ticket_count().unwrap(), 1);
    assert_eq!(harness.tickets_available(flight.id).await, 119);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_seats_inside_grid_are_sold(position in seat_within(flight_booking_core::SeatGrid::new(20, 6))) {
        let result = tokio_test::block_on(async {
            let harness = Harness::new();
            let flight = harness.fixtures.sample_flight().await.unwrap();
            harness
                .orders
                .create_order(Some(&customer()), vec![ticket(&flight, position.row, position.seat)])
                .await
        });
        prop_assert!(result.is_ok());
    }

    #[test]
    fn prop_seats_outside_grid_are_out_of_range(position in seat_outside(flight_booking_core::SeatGrid::new(20, 6))) {
        let (result, tickets) = tokio_test::block_on(async {
            let harness = Harness::new();
            let flight = harness.fixtures.sample_flight().await.unwrap();
            let result = harness
                .orders
                .create_order(
                    Some(&customer()),
                    vec![ticket(&flight, 1, 1), ticket(&flight, position.row, position.seat)],
                )
                .await;
            (result, harness.store.ticket_count().unwrap())
        });
        prop_assert!(
            matches!(result, Err(BookingError::OutOfRange { .. })),
            "unexpected result: {:?}",
            result
        );
        prop_assert_eq!(tickets, 0);
    }
}
