//! Seat availability for a flight.
//!
//! Everything here is a pure aggregation over the tickets that exist when the
//! flight was read; nothing is cached between reads.
//!
//! ```text
//! capacity          = rows × seats_in_row
//! tickets_sold      = |distinct (row, seat)|
//! tickets_available = capacity − tickets_sold
//! ```

use crate::derived::crew_count;
use crate::types::{CrewId, SeatGrid, SeatPosition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Occupied seats grouped by row: `row → ascending seat numbers`.
///
/// Rows without tickets are absent; iteration is in ascending row order.
pub type TakenSeats = BTreeMap<i32, Vec<i32>>;

/// Seat accounting for one flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// `rows × seats_in_row`
    pub capacity: i64,
    /// Distinct tickets sold
    pub tickets_sold: i64,
    /// Seats still free
    pub tickets_available: i64,
    /// Distinct crew members assigned
    pub crew_count: usize,
}

impl Availability {
    /// Compute availability from the seat grid, sold seats and assigned crew.
    #[must_use]
    pub fn compute(grid: SeatGrid, seats: &[SeatPosition], crews: &[CrewId]) -> Self {
        let capacity = grid.capacity();
        let sold = seats.iter().collect::<BTreeSet<_>>().len();
        let tickets_sold = i64::try_from(sold).unwrap_or(i64::MAX);

        Self {
            capacity,
            tickets_sold,
            tickets_available: capacity - tickets_sold,
            crew_count: crew_count(crews),
        }
    }
}

/// Group sold seats by row.
///
/// # Examples
///
/// ```
/// use flight_booking_core::availability::taken_seats;
/// use flight_booking_core::SeatPosition;
///
/// let seats = [
///     SeatPosition::new(1, 3),
///     SeatPosition::new(1, 1),
///     SeatPosition::new(2, 5),
/// ];
/// let taken = taken_seats(&seats);
/// assert_eq!(taken[&1], vec![1, 3]);
/// assert_eq!(taken[&2], vec![5]);
/// ```
#[must_use]
pub fn taken_seats(seats: &[SeatPosition]) -> TakenSeats {
    let mut taken = TakenSeats::new();
    for position in seats {
        taken.entry(position.row).or_default().push(position.seat);
    }
    for row in taken.values_mut() {
        row.sort_unstable();
        row.dedup();
    }
    taken
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_flight_is_fully_available() {
        let availability = Availability::compute(SeatGrid::new(20, 6), &[], &[CrewId::new(1)]);
        assert_eq!(availability.capacity, 120);
        assert_eq!(availability.tickets_sold, 0);
        assert_eq!(availability.tickets_available, 120);
        assert_eq!(availability.crew_count, 1);
    }

    #[test]
    fn test_sold_seats_reduce_availability() {
        let seats = [
            SeatPosition::new(1, 1),
            SeatPosition::new(1, 2),
            SeatPosition::new(3, 6),
        ];
        let availability = Availability::compute(SeatGrid::new(20, 6), &seats, &[]);
        assert_eq!(availability.tickets_sold, 3);
        assert_eq!(availability.tickets_available, 117);
    }

    #[test]
    fn test_duplicate_seats_count_once() {
        let seats = [SeatPosition::new(1, 1), SeatPosition::new(1, 1)];
        let availability = Availability::compute(SeatGrid::new(2, 2), &seats, &[]);
        assert_eq!(availability.tickets_sold, 1);
        assert_eq!(availability.tickets_available, 3);
    }

    #[test]
    fn test_taken_seats_sorted_by_row_then_seat() {
        let seats = [
            SeatPosition::new(1, 3),
            SeatPosition::new(2, 5),
            SeatPosition::new(1, 1),
        ];
        let taken = taken_seats(&seats);
        let expected: TakenSeats = [(1, vec![1, 3]), (2, vec![5])].into_iter().collect();
        assert_eq!(taken, expected);
        assert_eq!(taken.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_taken_seats_omits_empty_rows() {
        let taken = taken_seats(&[SeatPosition::new(4, 2)]);
        assert!(!taken.contains_key(&1));
        assert_eq!(taken.len(), 1);
    }
}
