//! Ticket validation.
//!
//! A requested ticket is valid when its seat lies inside the airplane's grid
//! and no other ticket holds the same seat on the same flight. Checks run in
//! a fixed order and stop at the first failure:
//!
//! 1. seat in `[1, seats_in_row]`
//! 2. row in `[1, rows]`
//! 3. seat not claimed earlier in the same batch
//! 4. seat not held by a persisted ticket
//!
//! The first two are pure and live on [`SeatGrid`]; the last two need the
//! batch state kept by [`TicketValidator`].

use crate::error::{BookingError, Result, SeatField};
use crate::types::{EntityKind, FlightId, SeatGrid, SeatPosition, TicketRequest};
use std::collections::{HashMap, HashSet};

impl SeatGrid {
    /// Whether `position` lies inside this grid.
    #[must_use]
    pub const fn contains(&self, position: SeatPosition) -> bool {
        position.seat >= 1
            && position.seat <= self.seats_in_row
            && position.row >= 1
            && position.row <= self.rows
    }

    /// Check `position` against this grid, seat first, then row.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::OutOfRange`] naming the first coordinate that
    /// falls outside the grid.
    ///
    /// # Examples
    ///
    /// ```
    /// use flight_booking_core::{BookingError, SeatField, SeatGrid, SeatPosition};
    ///
    /// let grid = SeatGrid::new(20, 6);
    /// assert!(grid.check(SeatPosition::new(1, 1)).is_ok());
    /// assert_eq!(
    ///     grid.check(SeatPosition::new(1, 10000)),
    ///     Err(BookingError::OutOfRange { field: SeatField::Seat, value: 10000, max: 6 })
    /// );
    /// ```
    pub const fn check(&self, position: SeatPosition) -> Result<()> {
        if position.seat < 1 || position.seat > self.seats_in_row {
            return Err(BookingError::OutOfRange {
                field: SeatField::Seat,
                value: position.seat,
                max: self.seats_in_row,
            });
        }
        if position.row < 1 || position.row > self.rows {
            return Err(BookingError::OutOfRange {
                field: SeatField::Row,
                value: position.row,
                max: self.rows,
            });
        }
        Ok(())
    }
}

/// Validates the tickets of one order in request order.
///
/// Seats accepted by [`claim`](Self::claim) are remembered, so a second
/// request for the same seat in the same batch is rejected as taken.
#[derive(Debug, Default)]
pub struct TicketValidator {
    grids: HashMap<FlightId, SeatGrid>,
    claimed: HashSet<(FlightId, SeatPosition)>,
}

impl TicketValidator {
    /// Creates an empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the seat grid of a locked flight.
    pub fn add_flight(&mut self, flight: FlightId, grid: SeatGrid) {
        self.grids.insert(flight, grid);
    }

    /// Run the pure checks for `request`: flight known, seat and row in range,
    /// seat not already claimed in this batch.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] for an unregistered flight,
    /// [`BookingError::OutOfRange`] or [`BookingError::SeatTaken`].
    pub fn check(&self, request: &TicketRequest) -> Result<()> {
        let grid = self
            .grids
            .get(&request.flight)
            .ok_or_else(|| BookingError::not_found(EntityKind::Flight, request.flight.get()))?;
        grid.check(request.position())?;

        if self.claimed.contains(&(request.flight, request.position())) {
            return Err(seat_taken(request));
        }
        Ok(())
    }

    /// Record `request` as accepted, so later duplicates in the batch fail.
    pub fn claim(&mut self, request: &TicketRequest) {
        self.claimed.insert((request.flight, request.position()));
    }

    /// Number of seats claimed so far.
    #[must_use]
    pub fn claimed(&self) -> usize {
        self.claimed.len()
    }
}

/// [`BookingError::SeatTaken`] for the seat named by `request`.
#[must_use]
pub const fn seat_taken(request: &TicketRequest) -> BookingError {
    BookingError::SeatTaken {
        flight: request.flight,
        row: request.row,
        seat: request.seat,
    }
}
