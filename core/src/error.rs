//! Error types for booking operations.

use crate::types::{EntityKind, FlightId};
use std::fmt;
use thiserror::Error;

/// Result type alias for booking operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Seat coordinate being range-checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeatField {
    /// The row number
    Row,
    /// The seat number within a row
    Seat,
}

impl SeatField {
    /// Field name as exposed to callers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Seat => "seat",
        }
    }
}

impl fmt::Display for SeatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every way a booking operation can fail.
///
/// All variants are per-request failures; none of them is fatal to the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    // ═══════════════════════════════════════════════════════════
    // Ticket validation
    // ═══════════════════════════════════════════════════════════

    /// Row or seat lies outside the airplane's seat grid.
    #[error("{field} must be in range [1, {max}], not {value}")]
    OutOfRange {
        /// Offending field
        field: SeatField,
        /// Requested value
        value: i32,
        /// Largest allowed value
        max: i32,
    },

    /// The seat already has a ticket.
    #[error("seat (row {row}, seat {seat}) on flight {flight} is already taken")]
    SeatTaken {
        /// Flight the seat belongs to
        flight: FlightId,
        /// Row
        row: i32,
        /// Seat
        seat: i32,
    },

    /// An order must contain at least one ticket.
    #[error("order must contain at least one ticket")]
    EmptyOrder,

    // ═══════════════════════════════════════════════════════════
    // Lookup and constraint failures
    // ═══════════════════════════════════════════════════════════

    /// Referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind
        entity: EntityKind,
        /// Raw identifier
        id: i64,
    },

    /// A unique value is already in use.
    #[error("{entity} with {value} already exists")]
    Duplicate {
        /// Entity kind
        entity: EntityKind,
        /// Conflicting value
        value: String,
    },

    /// Entity is still referenced and cannot be deleted.
    #[error("{entity} {id} is referenced by other records and cannot be deleted")]
    Protected {
        /// Entity kind
        entity: EntityKind,
        /// Raw identifier
        id: i64,
    },

    /// An input field violates an invariant.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Identity
    // ═══════════════════════════════════════════════════════════

    /// No authenticated identity was supplied.
    #[error("authentication required")]
    Unauthorized,

    /// Identity lacks the privilege for this operation.
    #[error("permission denied")]
    Forbidden,

    // ═══════════════════════════════════════════════════════════
    // System
    // ═══════════════════════════════════════════════════════════

    /// Persistence layer failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl BookingError {
    /// Shorthand for [`BookingError::NotFound`].
    #[must_use]
    pub const fn not_found(entity: EntityKind, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Shorthand for [`BookingError::InvalidField`].
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Returns `true` if the caller can fix the request and retry.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flight_booking_core::BookingError;
    /// assert!(BookingError::EmptyOrder.is_client_error());
    /// assert!(!BookingError::Storage("down".into()).is_client_error());
    /// ```
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }

    /// Short machine-readable label, used for metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::OutOfRange { .. } => "out_of_range",
            Self::SeatTaken { .. } => "seat_taken",
            Self::EmptyOrder => "empty_order",
            Self::NotFound { .. } => "not_found",
            Self::Duplicate { .. } => "duplicate",
            Self::Protected { .. } => "protected",
            Self::InvalidField { .. } => "invalid_field",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::Storage(_) => "storage",
        }
    }
}
