//! Order transactions.

use crate::error::{storage, violation, Violation, TICKET_SEAT_CONSTRAINT};
use crate::PostgresBookingStore;
use chrono::{DateTime, Utc};
use flight_booking_core::{
    BookingError, BookingTransaction, EntityKind, FlightId, Order, OrderId, Result, SeatGrid,
    SeatPosition, Ticket, TicketId, TicketRequest, UnitOfWork, UserId,
};
use sqlx::{Postgres, Transaction};

/// An open Postgres transaction.
///
/// Dropping it without calling `commit` rolls it back.
#[derive(Debug)]
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork for PostgresBookingStore {
    type Transaction = PostgresTransaction;

    async fn begin(&self) -> Result<PostgresTransaction> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage("begin transaction", &e))?;
        Ok(PostgresTransaction { tx })
    }
}

impl BookingTransaction for PostgresTransaction {
    async fn lock_flight(&mut self, flight: FlightId) -> Result<Option<SeatGrid>> {
        let grid: Option<(i32, i32)> = sqlx::query_as(
            r#"
            SELECT a."rows", a.seats_in_row
            FROM flights f
            JOIN airplanes a ON a.id = f.airplane_id
            WHERE f.id = $1
            FOR UPDATE OF f
            "#,
        )
        .bind(flight.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| storage("lock flight", &e))?;

        Ok(grid.map(|(rows, seats_in_row)| SeatGrid::new(rows, seats_in_row)))
    }

    async fn is_seat_taken(&mut self, flight: FlightId, seat: SeatPosition) -> Result<bool> {
        let (taken,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM tickets
                WHERE flight_id = $1 AND "row" = $2 AND seat = $3
            )
            "#,
        )
        .bind(flight.get())
        .bind(seat.row)
        .bind(seat.seat)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| storage("check seat", &e))?;

        Ok(taken)
    }

    async fn insert_order(&mut self, user: UserId, created_at: DateTime<Utc>) -> Result<Order> {
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r"
            INSERT INTO orders (created_at, user_id)
            VALUES ($1, $2)
            RETURNING id, created_at
            ",
        )
        .bind(created_at)
        .bind(user.get())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| storage("insert order", &e))?;

        Ok(Order {
            id: OrderId::new(id),
            created_at,
            user,
        })
    }

    async fn insert_ticket(&mut self, order: OrderId, request: TicketRequest) -> Result<Ticket> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO tickets ("row", seat, flight_id, order_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(request.row)
        .bind(request.seat)
        .bind(request.flight.get())
        .bind(order.get())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::Unique(Some(TICKET_SEAT_CONSTRAINT))) => {
                metrics::counter!("booking.store.seat_conflicts").increment(1);
                BookingError::SeatTaken {
                    flight: request.flight,
                    row: request.row,
                    seat: request.seat,
                }
            }
            Some(Violation::ForeignKey(Some("tickets_order_id_fkey"))) => {
                BookingError::not_found(EntityKind::Order, order.get())
            }
            Some(Violation::ForeignKey(_)) => {
                BookingError::not_found(EntityKind::Flight, request.flight.get())
            }
            _ => storage("insert ticket", &e),
        })?;

        Ok(Ticket {
            id: TicketId::new(id),
            row: request.row,
            seat: request.seat,
            flight: request.flight,
            order,
        })
    }

    async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| storage("commit transaction", &e))
    }

    async fn rollback(self) -> Result<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| storage("roll back transaction", &e))
    }
}
