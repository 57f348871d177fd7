use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the scheduling, rental and persistence layers.
#[derive(Error, Debug)]
pub enum RentalError {
    /// Input rejected before anything was stored.
    #[error("Validation failed: {0}")]
    Validation(String),
    /// A uniqueness rule or a stored-data invariant was violated.
    #[error("Integrity violation: {0}")]
    Integrity(String),
    /// The requested record or schedule does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
    /// The booking interval intersects an existing blocking booking.
    #[error("Booking overlaps existing booking {existing} for rental object {rental_object_id}")]
    BookingOverlap {
        /// Object both bookings refer to.
        rental_object_id: i64,
        /// Booking that already holds the interval.
        existing: Uuid,
    },
    /// Underlying database failure.
    #[error("Database query failed: {0}")]
    Database(#[from] sqlx::Error),
}

impl RentalError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Converts SQLite unique-constraint failures into `Integrity`.
    pub fn from_unique_violation(error: sqlx::Error, message: impl Into<String>) -> Self {
        let unique = matches!(&error, sqlx::Error::Database(db_error) if is_unique_violation(&**db_error));
        if unique {
            Self::Integrity(message.into())
        } else {
            Self::Database(error)
        }
    }
}

fn is_unique_violation(error: &dyn sqlx::error::DatabaseError) -> bool {
    // 2067 = SQLITE_CONSTRAINT_UNIQUE, 1555 = SQLITE_CONSTRAINT_PRIMARYKEY
    matches!(error.code().as_deref(), Some("2067") | Some("1555"))
        || error.message().contains("UNIQUE constraint failed")
}

pub type RentalResult<T> = Result<T, RentalError>;
