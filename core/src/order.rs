//! Atomic order creation.
//!
//! An order and all of its tickets are created in one transaction, or nothing
//! is created. Every requested ticket is validated before anything is
//! written:
//!
//! ```text
//! begin ─▶ lock flights (ascending id) ─▶ validate tickets in request order
//!       ─▶ insert order ─▶ insert tickets ─▶ commit
//!                 any failure ─▶ rollback
//! ```
//!
//! Every flight named by the order is locked before any seat is checked, so
//! concurrent orders for the same flight are serialised. Locks are taken in
//! ascending flight id order.

use crate::environment::Clock;
use crate::error::{BookingError, Result};
use crate::identity::{authenticated, Identity};
use crate::store::{BookingTransaction, UnitOfWork};
use crate::types::{FlightId, PlacedOrder, TicketRequest, UserId};
use crate::validator::{seat_taken, TicketValidator};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Step of the order flow, attached to log events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderStage {
    /// Taking row locks on the requested flights
    Locking,
    /// Checking seats against grids and sold tickets
    Validating,
    /// Inserting the order and its tickets
    Persisting,
    /// Committing the transaction
    Committing,
}

impl fmt::Display for OrderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Locking => "locking",
            Self::Validating => "validating",
            Self::Persisting => "persisting",
            Self::Committing => "committing",
        })
    }
}

/// Creates orders against a [`UnitOfWork`].
pub struct OrderService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for OrderService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: UnitOfWork> OrderService<S> {
    /// Creates a new `OrderService`.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create an order owned by the caller with one ticket per request.
    ///
    /// Tickets in the result are in request order. The order's creation time
    /// comes from the injected clock.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Unauthorized`]: no identity
    /// - [`BookingError::EmptyOrder`]: `tickets` is empty
    /// - [`BookingError::NotFound`]: a ticket names an unknown flight
    /// - [`BookingError::OutOfRange`]: seat or row outside the airplane grid
    /// - [`BookingError::SeatTaken`]: seat sold already or requested twice
    /// - [`BookingError::Storage`]: persistence failed
    ///
    /// On any error nothing is persisted. The error describes the first
    /// failing ticket in request order.
    #[tracing::instrument(skip(self, identity, tickets), fields(tickets = tickets.len()))]
    pub async fn create_order(
        &self,
        identity: Option<&Identity>,
        tickets: Vec<TicketRequest>,
    ) -> Result<PlacedOrder> {
        let result = self.place(identity, &tickets).await;

        match &result {
            Ok(placed) => {
                metrics::counter!("booking.orders.committed").increment(1);
                tracing::info!(
                    order_id = %placed.order.id,
                    user_id = %placed.order.user,
                    tickets = placed.tickets.len(),
                    "Order committed"
                );
            }
            Err(error) => {
                metrics::counter!("booking.orders.rejected", "reason" => error.kind())
                    .increment(1);
                if error.is_client_error() {
                    tracing::info!(reason = error.kind(), %error, "Order rejected");
                } else {
                    tracing::error!(%error, "Order failed");
                }
            }
        }

        result
    }

    async fn place(
        &self,
        identity: Option<&Identity>,
        tickets: &[TicketRequest],
    ) -> Result<PlacedOrder> {
        let identity = authenticated(identity)?;
        if tickets.is_empty() {
            return Err(BookingError::EmptyOrder);
        }

        let mut tx = self.store.begin().await?;
        let created_at = self.clock.now();

        match write_order(&mut tx, identity.user, created_at, tickets).await {
            Ok(placed) => {
                tracing::debug!(stage = %OrderStage::Committing, "Committing order");
                tx.commit().await?;
                Ok(placed)
            }
            Err(error) => {
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::error!(%rollback_error, "Rollback failed");
                }
                Err(error)
            }
        }
    }
}

async fn write_order<T: BookingTransaction>(
    tx: &mut T,
    user: UserId,
    created_at: DateTime<Utc>,
    tickets: &[TicketRequest],
) -> Result<PlacedOrder> {
    let flights: BTreeSet<FlightId> = tickets.iter().map(|ticket| ticket.flight).collect();

    tracing::debug!(stage = %OrderStage::Locking, flights = flights.len(), "Locking flights");
    let mut validator = TicketValidator::new();
    for flight in flights {
        // Unknown flights stay unregistered and fail in request order below.
        if let Some(grid) = tx.lock_flight(flight).await? {
            validator.add_flight(flight, grid);
        }
    }

    tracing::debug!(stage = %OrderStage::Validating, "Validating tickets");
    for request in tickets {
        validator.check(request)?;
        if tx.is_seat_taken(request.flight, request.position()).await? {
            return Err(seat_taken(request));
        }
        validator.claim(request);
    }

    tracing::debug!(stage = %OrderStage::Persisting, "Inserting order");
    let order = tx.insert_order(user, created_at).await?;
    let mut created = Vec::with_capacity(tickets.len());
    for request in tickets {
        created.push(tx.insert_ticket(order.id, *request).await?);
    }

    Ok(PlacedOrder {
        order,
        tickets: created,
    })
}
