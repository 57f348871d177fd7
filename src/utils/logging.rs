use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Logs booking lifecycle events with consistent format
pub fn log_booking_event(event: &str, booking_id: Uuid, rental_object_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!(
            "BOOKING: {} {} for rental object {} - {}",
            event, booking_id, rental_object_id, d
        ),
        None => info!("BOOKING: {} {} for rental object {}", event, booking_id, rental_object_id),
    }
}

/// Logs rejected bookings with consistent format
pub fn log_booking_rejected(rental_object_id: i64, user_id: i64, error: &str) {
    warn!(
        "BOOKING_REJECTED: rental object {} for user {} - {}",
        rental_object_id, user_id, error
    );
}

/// Logs validation errors with consistent format
pub fn log_validation_error(operation: &str, field: &str, value: &str, error: &str) {
    warn!(
        "VALIDATION_ERROR: {} - {} field '{}' invalid: {}",
        operation, field, value, error
    );
}

/// Logs database operations with consistent format
pub fn log_database_operation(operation: &str, table: &str, details: Option<&str>) {
    match details {
        Some(d) => debug!("DB_OP: {} on {} - {}", operation, table, d),
        None => debug!("DB_OP: {} on {}", operation, table),
    }
}

/// Logs database errors with consistent format
pub fn log_database_error(operation: &str, table: &str, error: &str, details: Option<&str>) {
    match details {
        Some(d) => error!("DB_ERROR: {} on {} failed: {} - {}", operation, table, error, d),
        None => error!("DB_ERROR: {} on {} failed: {}", operation, table, error),
    }
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
