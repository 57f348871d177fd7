use chrono::NaiveDateTime;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{RentalError, RentalResult};
use crate::rental::{check_bookable, BlockingPolicy, RegistrationBook, RentalObject};
use crate::scheduling::ServiceLocation;
use crate::users::TelegramUser;
use crate::utils::logging::{log_booking_event, log_booking_rejected, log_database_operation};

#[derive(Debug, Clone, FromRow)]
pub struct RegistrationBookRow {
    pub id: String,
    pub user_id: i64,
    pub rental_object_id: i64,
    pub start_datetime: NaiveDateTime,
    pub end_datetime: NaiveDateTime,
    pub is_confirmed: bool,
    pub payment_id: Option<String>,
    pub amount: Option<i64>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<RegistrationBookRow> for RegistrationBook {
    type Error = RentalError;

    fn try_from(row: RegistrationBookRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|_| RentalError::integrity(format!("malformed booking id '{}'", row.id)))?;

        Ok(RegistrationBook::from_parts(
            id,
            row.user_id,
            row.rental_object_id,
            row.start_datetime,
            row.end_datetime,
            row.is_confirmed,
            row.payment_id,
            row.amount,
            row.created_at,
        ))
    }
}

const SELECT_BOOKING: &str = "SELECT id, user_id, rental_object_id, start_datetime, end_datetime, is_confirmed, payment_id, amount, created_at FROM registration_books";

impl RegistrationBook {
    /// Validates and stores a pending booking.
    ///
    /// The overlap check and the insert run as a single statement, so two
    /// writers cannot both take the same interval.
    pub async fn create(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        rental_object_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
        policy: BlockingPolicy,
    ) -> RentalResult<RegistrationBook> {
        let booking = RegistrationBook::new(user_id, rental_object_id, start, end)?;

        if TelegramUser::find_by_id(pool, user_id).await?.is_none() {
            return Err(RentalError::not_found(format!("telegram user {}", user_id)));
        }
        let object = RentalObject::find_by_id(pool, rental_object_id)
            .await?
            .ok_or_else(|| RentalError::not_found(format!("rental object {}", rental_object_id)))?;
        let locations = ServiceLocation::find_by_rental_object(pool, rental_object_id).await?;
        let location_refs: Vec<&ServiceLocation> = locations.iter().collect();
        check_bookable(&object, &location_refs, &booking).map_err(|e| {
            log_booking_rejected(rental_object_id, user_id, &e.to_string());
            e
        })?;

        log_database_operation("INSERT", "registration_books", Some(&booking.id.to_string()));
        let result = sqlx::query(
            r#"
            INSERT INTO registration_books
                (id, user_id, rental_object_id, start_date, end_date, start_datetime, end_datetime, is_confirmed, created_at)
            SELECT ?, ?, ?, ?, ?, ?, ?, 0, ?
            WHERE NOT EXISTS (
                SELECT 1 FROM registration_books
                WHERE rental_object_id = ?
                  AND start_datetime < ?
                  AND end_datetime > ?
                  AND (is_confirmed = 1 OR ?)
            )
            "#
        )
        .bind(booking.id.to_string())
        .bind(booking.user_id)
        .bind(booking.rental_object_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.start_datetime)
        .bind(booking.end_datetime)
        .bind(booking.created_at)
        .bind(rental_object_id)
        .bind(booking.end_datetime)
        .bind(booking.start_datetime)
        .bind(policy == BlockingPolicy::AllBookings)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            let err = overlap_error(pool, &booking, policy).await?;
            log_booking_rejected(rental_object_id, user_id, &err.to_string());
            return Err(err);
        }

        log_booking_event("created", booking.id, rental_object_id, None);
        Ok(booking)
    }

    /// Confirms a pending booking if no confirmed booking took its interval meanwhile.
    pub async fn confirm(pool: &sqlx::SqlitePool, id: Uuid) -> RentalResult<RegistrationBook> {
        let booking = Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| RentalError::not_found(format!("booking {}", id)))?;
        if booking.is_confirmed() {
            return Err(RentalError::validation(format!("Booking {} is already confirmed", id)));
        }

        log_database_operation("UPDATE", "registration_books", Some(&format!("confirm {}", id)));
        let result = sqlx::query(
            r#"
            UPDATE registration_books SET is_confirmed = 1
            WHERE id = ?
              AND is_confirmed = 0
              AND NOT EXISTS (
                SELECT 1 FROM registration_books other
                WHERE other.rental_object_id = ?
                  AND other.id <> ?
                  AND other.is_confirmed = 1
                  AND other.start_datetime < ?
                  AND other.end_datetime > ?
              )
            "#
        )
        .bind(id.to_string())
        .bind(booking.rental_object_id)
        .bind(id.to_string())
        .bind(booking.end_datetime)
        .bind(booking.start_datetime)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(overlap_error(pool, &booking, BlockingPolicy::ConfirmedOnly).await?);
        }

        log_booking_event("confirmed", id, booking.rental_object_id, None);
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| RentalError::not_found(format!("booking {}", id)))
    }

    /// Records payment details on a pending booking.
    pub async fn store_payment(
        pool: &sqlx::SqlitePool,
        id: Uuid,
        payment_id: &str,
        amount: i64,
    ) -> RentalResult<RegistrationBook> {
        let mut booking = Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| RentalError::not_found(format!("booking {}", id)))?;
        booking.record_payment(payment_id, amount)?;

        let result = sqlx::query(
            "UPDATE registration_books SET payment_id = ?, amount = ? WHERE id = ? AND is_confirmed = 0"
        )
        .bind(payment_id)
        .bind(amount)
        .bind(id.to_string())
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RentalError::validation(format!(
                "Booking {} is confirmed and can no longer change",
                id
            )));
        }

        log_booking_event("paid", id, booking.rental_object_id, Some(payment_id));
        Ok(booking)
    }

    /// Deletes a pending booking. Confirmed bookings stay.
    pub async fn cancel(pool: &sqlx::SqlitePool, id: Uuid) -> RentalResult<()> {
        let booking = Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| RentalError::not_found(format!("booking {}", id)))?;
        booking.ensure_cancellable()?;

        let result = sqlx::query("DELETE FROM registration_books WHERE id = ? AND is_confirmed = 0")
            .bind(id.to_string())
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RentalError::validation(format!("Booking {} can no longer be cancelled", id)));
        }

        log_booking_event("cancelled", id, booking.rental_object_id, None);
        Ok(())
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: Uuid) -> RentalResult<Option<RegistrationBook>> {
        let row = sqlx::query_as::<_, RegistrationBookRow>(&format!("{} WHERE id = ?", SELECT_BOOKING))
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?;

        row.map(RegistrationBook::try_from).transpose()
    }

    pub async fn find_by_rental_object(
        pool: &sqlx::SqlitePool,
        rental_object_id: i64,
    ) -> RentalResult<Vec<RegistrationBook>> {
        let rows = sqlx::query_as::<_, RegistrationBookRow>(&format!(
            "{} WHERE rental_object_id = ? ORDER BY start_datetime",
            SELECT_BOOKING
        ))
        .bind(rental_object_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(RegistrationBook::try_from).collect()
    }

    pub async fn find_by_user(pool: &sqlx::SqlitePool, user_id: i64) -> RentalResult<Vec<RegistrationBook>> {
        let rows = sqlx::query_as::<_, RegistrationBookRow>(&format!(
            "{} WHERE user_id = ? ORDER BY start_datetime",
            SELECT_BOOKING
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(RegistrationBook::try_from).collect()
    }
}

/// Builds the error for a booking whose write was refused.
async fn overlap_error(
    pool: &sqlx::SqlitePool,
    booking: &RegistrationBook,
    policy: BlockingPolicy,
) -> RentalResult<RentalError> {
    let existing = sqlx::query_scalar::<_, String>(
        r#"
        SELECT id FROM registration_books
        WHERE rental_object_id = ?
          AND id <> ?
          AND start_datetime < ?
          AND end_datetime > ?
          AND (is_confirmed = 1 OR ?)
        ORDER BY start_datetime
        LIMIT 1
        "#
    )
    .bind(booking.rental_object_id)
    .bind(booking.id.to_string())
    .bind(booking.end_datetime)
    .bind(booking.start_datetime)
    .bind(policy == BlockingPolicy::AllBookings)
    .fetch_optional(pool)
    .await?;

    Ok(match existing.as_deref().map(Uuid::parse_str) {
        Some(Ok(existing)) => RentalError::BookingOverlap {
            rental_object_id: booking.rental_object_id,
            existing,
        },
        Some(Err(_)) => RentalError::integrity("malformed booking id in registration_books"),
        None => RentalError::validation(format!("Booking {} could not be written", booking.id)),
    })
}
