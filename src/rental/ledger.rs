use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RentalError, RentalResult};
use crate::rental::booking::RegistrationBook;

/// Which bookings hold their interval against later ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockingPolicy {
    /// Pending bookings may overlap; an interval is taken once confirmed.
    #[default]
    ConfirmedOnly,
    /// Every booking takes its interval from creation.
    AllBookings,
}

impl BlockingPolicy {
    pub fn blocks(self, booking: &RegistrationBook) -> bool {
        match self {
            BlockingPolicy::ConfirmedOnly => booking.is_confirmed(),
            BlockingPolicy::AllBookings => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockingPolicy::ConfirmedOnly => "confirmed-only",
            BlockingPolicy::AllBookings => "all",
        }
    }
}

impl fmt::Display for BlockingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockingPolicy {
    type Err = RentalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "confirmed-only" | "confirmed" => Ok(BlockingPolicy::ConfirmedOnly),
            "all" | "all-bookings" => Ok(BlockingPolicy::AllBookings),
            other => Err(RentalError::validation(format!("Unknown blocking policy '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    start: NaiveDateTime,
    end: NaiveDateTime,
    id: Uuid,
}

/// Bookings of a single rental object.
///
/// Blocking intervals are kept sorted by start and pairwise disjoint, so the
/// only one that can intersect `[start, end)` is the last one starting before
/// `end`.
#[derive(Debug, Clone)]
pub struct BookingLedger {
    rental_object_id: i64,
    policy: BlockingPolicy,
    bookings: Vec<RegistrationBook>,
    blocking: Vec<Slot>,
}

impl BookingLedger {
    pub fn new(rental_object_id: i64, policy: BlockingPolicy) -> Self {
        Self {
            rental_object_id,
            policy,
            bookings: Vec::new(),
            blocking: Vec::new(),
        }
    }

    pub fn rental_object_id(&self) -> i64 {
        self.rental_object_id
    }

    pub fn policy(&self) -> BlockingPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    /// Bookings ordered by start.
    pub fn bookings(&self) -> &[RegistrationBook] {
        &self.bookings
    }

    pub fn get(&self, id: Uuid) -> Option<&RegistrationBook> {
        self.bookings.iter().find(|b| b.id == id)
    }

    fn conflict(&self, start: NaiveDateTime, end: NaiveDateTime, ignore: Option<Uuid>) -> Option<Uuid> {
        let idx = self.blocking.partition_point(|slot| slot.start < end);
        self.blocking[..idx]
            .iter()
            .rev()
            .find(|slot| Some(slot.id) != ignore)
            .filter(|slot| slot.end > start)
            .map(|slot| slot.id)
    }

    fn ensure_free(&self, start: NaiveDateTime, end: NaiveDateTime, ignore: Option<Uuid>) -> RentalResult<()> {
        match self.conflict(start, end, ignore) {
            Some(existing) => Err(RentalError::BookingOverlap {
                rental_object_id: self.rental_object_id,
                existing,
            }),
            None => Ok(()),
        }
    }

    /// Whether `[start, end)` is free of blocking bookings.
    pub fn is_free(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.conflict(start, end, None).is_none()
    }

    fn insert_slot(&mut self, booking: &RegistrationBook) {
        let slot = Slot {
            start: booking.start_datetime,
            end: booking.end_datetime,
            id: booking.id,
        };
        let idx = self.blocking.partition_point(|s| s.start < slot.start);
        self.blocking.insert(idx, slot);
    }

    fn remove_slot(&mut self, id: Uuid) {
        self.blocking.retain(|slot| slot.id != id);
    }

    fn insert_booking(&mut self, booking: RegistrationBook) -> &RegistrationBook {
        let idx = self
            .bookings
            .partition_point(|b| b.start_datetime <= booking.start_datetime);
        self.bookings.insert(idx, booking);
        &self.bookings[idx]
    }

    fn position(&self, id: Uuid) -> RentalResult<usize> {
        self.bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| RentalError::not_found(format!("booking {}", id)))
    }

    /// Adds a booking, rejecting it if it intersects a blocking interval.
    pub fn insert(&mut self, booking: RegistrationBook) -> RentalResult<&RegistrationBook> {
        if booking.rental_object_id != self.rental_object_id {
            return Err(RentalError::integrity(format!(
                "booking {} belongs to rental object {}, not {}",
                booking.id, booking.rental_object_id, self.rental_object_id
            )));
        }
        if self.bookings.iter().any(|b| b.id == booking.id) {
            return Err(RentalError::integrity(format!("booking {} already exists", booking.id)));
        }

        self.ensure_free(booking.start_datetime, booking.end_datetime, None)?;

        if self.policy.blocks(&booking) {
            self.insert_slot(&booking);
        }
        Ok(self.insert_booking(booking))
    }

    /// Confirms a pending booking after re-checking its interval.
    pub fn confirm(&mut self, id: Uuid) -> RentalResult<&RegistrationBook> {
        let idx = self.position(id)?;
        let booking = &self.bookings[idx];
        if booking.is_confirmed() {
            return Err(RentalError::validation(format!("Booking {} is already confirmed", id)));
        }

        let already_blocking = self.policy.blocks(booking);
        if !already_blocking {
            self.ensure_free(booking.start_datetime, booking.end_datetime, Some(id))?;
        }

        self.bookings[idx].mark_confirmed()?;
        if !already_blocking {
            let confirmed = self.bookings[idx].clone();
            self.insert_slot(&confirmed);
        }
        Ok(&self.bookings[idx])
    }

    /// Moves a pending booking to a new interval.
    pub fn reschedule(
        &mut self,
        id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RentalResult<&RegistrationBook> {
        let idx = self.position(id)?;
        let mut booking = self.bookings[idx].clone();
        booking.reschedule(start, end)?;
        self.ensure_free(start, end, Some(id))?;

        self.bookings.remove(idx);
        if self.policy.blocks(&booking) {
            self.remove_slot(id);
            self.insert_slot(&booking);
        }
        Ok(self.insert_booking(booking))
    }

    /// Removes a pending booking. Confirmed bookings cannot be cancelled.
    pub fn cancel(&mut self, id: Uuid) -> RentalResult<RegistrationBook> {
        let idx = self.position(id)?;
        self.bookings[idx].ensure_cancellable()?;
        self.remove_slot(id);
        Ok(self.bookings.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn booking(start: NaiveDateTime, end: NaiveDateTime) -> RegistrationBook {
        RegistrationBook::new(42, 7, start, end).unwrap()
    }

    fn confirmed(ledger: &mut BookingLedger, start: NaiveDateTime, end: NaiveDateTime) -> Uuid {
        let id = ledger.insert(booking(start, end)).unwrap().id;
        ledger.confirm(id).unwrap();
        id
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("confirmed-only".parse::<BlockingPolicy>().unwrap(), BlockingPolicy::ConfirmedOnly);
        assert_eq!(" ALL ".parse::<BlockingPolicy>().unwrap(), BlockingPolicy::AllBookings);
        assert!("sometimes".parse::<BlockingPolicy>().is_err());
        assert_eq!(BlockingPolicy::default(), BlockingPolicy::ConfirmedOnly);
    }

    #[test]
    fn test_rejects_overlap_with_confirmed() {
        let mut ledger = BookingLedger::new(7, BlockingPolicy::ConfirmedOnly);
        let existing = confirmed(&mut ledger, at(1, 10), at(5, 10));

        let err = ledger.insert(booking(at(4, 10), at(6, 10))).unwrap_err();
        assert!(matches!(err, RentalError::BookingOverlap { existing: id, .. } if id == existing));

        // Fully contained and fully containing intervals also collide
        assert!(ledger.insert(booking(at(2, 0), at(3, 0))).is_err());
        assert!(ledger.insert(booking(at(1, 0), at(9, 0))).is_err());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_adjacent_bookings_allowed() {
        let mut ledger = BookingLedger::new(7, BlockingPolicy::ConfirmedOnly);
        confirmed(&mut ledger, at(1, 10), at(5, 10));
        confirmed(&mut ledger, at(5, 10), at(7, 10));
        confirmed(&mut ledger, at(1, 0), at(1, 10));

        let starts: Vec<NaiveDateTime> = ledger.bookings().iter().map(|b| b.start_datetime).collect();
        assert_eq!(starts, vec![at(1, 0), at(1, 10), at(5, 10)]);
    }

    #[test]
    fn test_gap_between_confirmed_bookings() {
        let mut ledger = BookingLedger::new(7, BlockingPolicy::ConfirmedOnly);
        confirmed(&mut ledger, at(2, 0), at(4, 0));
        confirmed(&mut ledger, at(10, 0), at(12, 0));

        assert!(ledger.is_free(at(4, 0), at(10, 0)));
        assert!(ledger.is_free(at(1, 0), at(2, 0)));
        assert!(!ledger.is_free(at(3, 0), at(5, 0)));
        assert!(!ledger.is_free(at(9, 0), at(11, 0)));
        // Spans both bookings without starting inside either
        assert!(!ledger.is_free(at(1, 0), at(20, 0)));
    }

    #[test]
    fn test_pending_bookings_overlap_until_confirmed() {
        let mut ledger = BookingLedger::new(7, BlockingPolicy::ConfirmedOnly);
        let first = ledger.insert(booking(at(1, 10), at(3, 10))).unwrap().id;
        let second = ledger.insert(booking(at(2, 10), at(4, 10))).unwrap().id;
        assert_eq!(ledger.len(), 2);

        ledger.confirm(first).unwrap();
        assert!(matches!(ledger.confirm(second), Err(RentalError::BookingOverlap { .. })));
        assert!(!ledger.get(second).unwrap().is_confirmed());
    }

    #[test]
    fn test_all_bookings_policy_blocks_pending() {
        let mut ledger = BookingLedger::new(7, BlockingPolicy::AllBookings);
        let first = ledger.insert(booking(at(1, 10), at(3, 10))).unwrap().id;
        assert!(ledger.insert(booking(at(2, 10), at(4, 10))).is_err());

        ledger.confirm(first).unwrap();
        assert!(ledger.get(first).unwrap().is_confirmed());
    }

    #[test]
    fn test_cancel_only_pending() {
        let mut ledger = BookingLedger::new(7, BlockingPolicy::AllBookings);
        let pending = ledger.insert(booking(at(1, 10), at(3, 10))).unwrap().id;
        let fixed = confirmed(&mut ledger, at(5, 10), at(6, 10));

        ledger.cancel(pending).unwrap();
        assert!(ledger.is_free(at(1, 10), at(3, 10)));
        assert!(ledger.cancel(fixed).is_err());
        assert!(matches!(ledger.cancel(Uuid::new_v4()), Err(RentalError::NotFound(_))));
    }

    #[test]
    fn test_reschedule_rechecks_interval() {
        let mut ledger = BookingLedger::new(7, BlockingPolicy::AllBookings);
        let id = ledger.insert(booking(at(1, 10), at(3, 10))).unwrap().id;
        confirmed(&mut ledger, at(10, 10), at(12, 10));

        // Moving within its own interval does not conflict with itself
        ledger.reschedule(id, at(2, 10), at(4, 10)).unwrap();
        assert!(ledger.is_free(at(1, 10), at(2, 10)));
        assert!(ledger.reschedule(id, at(9, 10), at(11, 10)).is_err());
        assert_eq!(ledger.get(id).unwrap().start_datetime, at(2, 10));
    }

    #[test]
    fn test_rejects_foreign_booking() {
        let mut ledger = BookingLedger::new(7, BlockingPolicy::ConfirmedOnly);
        let other = RegistrationBook::new(42, 8, at(1, 10), at(2, 10)).unwrap();
        assert!(matches!(ledger.insert(other), Err(RentalError::Integrity(_))));
    }
}
