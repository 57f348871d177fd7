use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RentalError, RentalResult};
use crate::rental::object::RentalObject;

/// Booking of one rental object by one Telegram user.
///
/// Confirmed bookings are frozen: dates, payment details and cancellation are
/// all rejected once `is_confirmed` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationBook {
    pub id: Uuid,
    pub user_id: i64,
    pub rental_object_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_datetime: NaiveDateTime,
    pub end_datetime: NaiveDateTime,
    is_confirmed: bool,
    payment_id: Option<String>,
    amount: Option<i64>,
    pub created_at: NaiveDateTime,
}

impl RegistrationBook {
    pub fn new(
        user_id: i64,
        rental_object_id: i64,
        start_datetime: NaiveDateTime,
        end_datetime: NaiveDateTime,
    ) -> RentalResult<Self> {
        if end_datetime <= start_datetime {
            return Err(RentalError::validation(format!(
                "Booking must end after it starts ({} - {})",
                start_datetime, end_datetime
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            rental_object_id,
            start_date: start_datetime.date(),
            end_date: end_datetime.date(),
            start_datetime,
            end_datetime,
            is_confirmed: false,
            payment_id: None,
            amount: None,
            created_at: Utc::now().naive_utc(),
        })
    }

    /// Rebuilds a stored booking without re-running creation checks.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: Uuid,
        user_id: i64,
        rental_object_id: i64,
        start_datetime: NaiveDateTime,
        end_datetime: NaiveDateTime,
        is_confirmed: bool,
        payment_id: Option<String>,
        amount: Option<i64>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            user_id,
            rental_object_id,
            start_date: start_datetime.date(),
            end_date: end_datetime.date(),
            start_datetime,
            end_datetime,
            is_confirmed,
            payment_id,
            amount,
            created_at,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.is_confirmed
    }

    pub fn payment_id(&self) -> Option<&str> {
        self.payment_id.as_deref()
    }

    pub fn amount(&self) -> Option<i64> {
        self.amount
    }

    /// Whole days between start and end date.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    pub fn calculate_total_price(&self, object: &RentalObject) -> RentalResult<i64> {
        object.price_for(self.duration_days())
    }

    /// Half-open interval intersection on the booked timestamps.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start_datetime < end && start < self.end_datetime
    }

    fn ensure_mutable(&self) -> RentalResult<()> {
        if self.is_confirmed {
            return Err(RentalError::validation(format!(
                "Booking {} is confirmed and can no longer change",
                self.id
            )));
        }
        Ok(())
    }

    pub fn record_payment(&mut self, payment_id: impl Into<String>, amount: i64) -> RentalResult<()> {
        self.ensure_mutable()?;
        if amount <= 0 {
            return Err(RentalError::validation("Payment amount must be greater than zero"));
        }
        self.payment_id = Some(payment_id.into());
        self.amount = Some(amount);
        Ok(())
    }

    pub fn reschedule(&mut self, start_datetime: NaiveDateTime, end_datetime: NaiveDateTime) -> RentalResult<()> {
        self.ensure_mutable()?;
        let moved = Self::new(self.user_id, self.rental_object_id, start_datetime, end_datetime)?;
        self.start_date = moved.start_date;
        self.end_date = moved.end_date;
        self.start_datetime = moved.start_datetime;
        self.end_datetime = moved.end_datetime;
        Ok(())
    }

    pub(crate) fn mark_confirmed(&mut self) -> RentalResult<()> {
        self.ensure_mutable()?;
        self.is_confirmed = true;
        Ok(())
    }

    pub(crate) fn ensure_cancellable(&self) -> RentalResult<()> {
        self.ensure_mutable()
    }
}
