//! Mapping from `sqlx` failures to booking errors.
//!
//! Constraint violations are recognised by SQLSTATE and attributed through the
//! constraint names declared in `migrations/0001_initial.sql`.

use flight_booking_core::{BookingError, EntityKind};
use thiserror::Error;

/// `unique_violation`
pub const UNIQUE_VIOLATION: &str = "23505";
/// `foreign_key_violation`
pub const FOREIGN_KEY_VIOLATION: &str = "23503";
/// `check_violation`
pub const CHECK_VIOLATION: &str = "23514";

/// Unique constraint guarding one ticket per seat.
pub const TICKET_SEAT_CONSTRAINT: &str = "tickets_flight_row_seat_key";

/// Errors raised while connecting to or preparing the database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The database did not accept connections in time.
    #[error("database unavailable after {attempts} attempts: {source}")]
    Unavailable {
        /// Connection attempts made
        attempts: u32,
        /// Last connection error
        #[source]
        source: sqlx::Error,
    },

    /// Applying migrations failed.
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Any other driver failure.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// A constraint violation reported by Postgres.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Violation<'a> {
    /// `23505`
    Unique(Option<&'a str>),
    /// `23503`
    ForeignKey(Option<&'a str>),
    /// `23514`
    Check(Option<&'a str>),
}

impl Violation<'_> {
    /// Name of the violated constraint, when reported.
    #[must_use]
    pub const fn constraint(&self) -> Option<&str> {
        match self {
            Self::Unique(name) | Self::ForeignKey(name) | Self::Check(name) => *name,
        }
    }
}

/// Classify `error` as a constraint violation.
#[must_use]
pub fn violation(error: &sqlx::Error) -> Option<Violation<'_>> {
    let sqlx::Error::Database(db_err) = error else {
        return None;
    };
    let constraint = db_err.constraint();
    match db_err.code().as_deref() {
        Some(UNIQUE_VIOLATION) => Some(Violation::Unique(constraint)),
        Some(FOREIGN_KEY_VIOLATION) => Some(Violation::ForeignKey(constraint)),
        Some(CHECK_VIOLATION) => Some(Violation::Check(constraint)),
        _ => None,
    }
}

/// Wrap any driver failure as [`BookingError::Storage`].
pub(crate) fn storage(context: &str, error: &sqlx::Error) -> BookingError {
    BookingError::Storage(format!("Failed to {context}: {error}"))
}

/// Map an insert failure: unique → `Duplicate`, foreign key → `NotFound`
/// for the referenced entity picked by `referenced`.
pub(crate) fn insert_error(
    context: &str,
    error: &sqlx::Error,
    duplicate: impl FnOnce() -> BookingError,
    referenced: impl FnOnce(Option<&str>) -> (EntityKind, i64),
) -> BookingError {
    match violation(error) {
        Some(Violation::Unique(_)) => duplicate(),
        Some(Violation::ForeignKey(constraint)) => {
            let (entity, id) = referenced(constraint);
            BookingError::not_found(entity, id)
        }
        Some(check @ Violation::Check(_)) => BookingError::invalid(
            "input",
            format!("violates {}", check.constraint().unwrap_or("a check constraint")),
        ),
        None => storage(context, error),
    }
}

/// `Duplicate` for a name clash.
pub(crate) fn duplicate_name(entity: EntityKind, name: &str) -> BookingError {
    BookingError::Duplicate {
        entity,
        value: format!("name {name}"),
    }
}
