use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::error::{RentalError, RentalResult};
use crate::rental::booking::RegistrationBook;
use crate::rental::ledger::{BlockingPolicy, BookingLedger};
use crate::rental::object::{NewRentalObject, RentalImage, RentalObject};
use crate::scheduling::{NewServiceLocation, ServiceLocation, WorkDay};
use crate::utils::logging::{log_booking_event, log_booking_rejected, log_validation_error};

/// Checks a new booking against its object and the object's locations.
///
/// The object must be marked available and the booking must last at least the
/// object's minimum. When the object has locations, one of them must be open
/// at both the start and the end of the booking.
pub fn check_bookable(
    object: &RentalObject,
    locations: &[&ServiceLocation],
    booking: &RegistrationBook,
) -> RentalResult<()> {
    if !object.is_available {
        return Err(RentalError::validation(format!("{} is not available for rent", object.name)));
    }
    object.check_duration(booking.duration_days())?;

    let (start, end) = (booking.start_datetime, booking.end_datetime);
    let mut last_error = None;
    for location in locations {
        let open = location
            .check_available(start.date(), start.time())
            .and_then(|_| location.check_available(end.date(), end.time()));
        match open {
            Ok(()) => return Ok(()),
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// A rental object removed from the catalog together with everything it owned.
#[derive(Debug, Clone)]
pub struct RemovedRentalObject {
    pub object: RentalObject,
    pub bookings: Vec<RegistrationBook>,
}

/// In-memory store of schedules, locations, rental objects and their bookings.
///
/// Rental objects own their images and bookings; removing an object drops both.
#[derive(Debug, Clone, Default)]
pub struct RentalCatalog {
    policy: BlockingPolicy,
    next_id: i64,
    work_days: BTreeMap<i64, WorkDay>,
    locations: BTreeMap<i64, ServiceLocation>,
    objects: BTreeMap<i64, RentalObject>,
    ledgers: BTreeMap<i64, BookingLedger>,
}

impl RentalCatalog {
    pub fn new(policy: BlockingPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> BlockingPolicy {
        self.policy
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Registers a window; the (day, start, end) triple must be new.
    pub fn add_work_day(&mut self, work_day: WorkDay) -> RentalResult<i64> {
        if self.work_days.values().any(|d| d.key() == work_day.key()) {
            return Err(RentalError::integrity(format!("work day {} already exists", work_day)));
        }

        let id = self.allocate_id();
        self.work_days.insert(id, work_day.with_id(id));
        Ok(id)
    }

    pub fn work_day(&self, id: i64) -> Option<&WorkDay> {
        self.work_days.get(&id)
    }

    /// Deletes a window and detaches it from every location using it.
    pub fn remove_work_day(&mut self, id: i64) -> RentalResult<WorkDay> {
        let work_day = self
            .work_days
            .remove(&id)
            .ok_or_else(|| RentalError::not_found(format!("work day {}", id)))?;
        for location in self.locations.values_mut() {
            location.remove_work_day(&work_day);
        }
        Ok(work_day)
    }

    pub fn add_location(&mut self, fields: NewServiceLocation) -> RentalResult<i64> {
        let location = ServiceLocation::new(fields)?;
        let id = self.allocate_id();
        self.locations.insert(id, location.with_id(id));
        Ok(id)
    }

    pub fn location(&self, id: i64) -> Option<&ServiceLocation> {
        self.locations.get(&id)
    }

    pub fn attach_work_day(&mut self, location_id: i64, work_day_id: i64) -> RentalResult<bool> {
        let work_day = self
            .work_days
            .get(&work_day_id)
            .cloned()
            .ok_or_else(|| RentalError::not_found(format!("work day {}", work_day_id)))?;
        let location = self
            .locations
            .get_mut(&location_id)
            .ok_or_else(|| RentalError::not_found(format!("service location {}", location_id)))?;
        Ok(location.add_work_day(work_day))
    }

    pub fn add_rental_object(&mut self, fields: NewRentalObject) -> RentalResult<i64> {
        let object = RentalObject::new(fields)?;
        if let Some(missing) = object.locations.iter().find(|id| !self.locations.contains_key(*id)) {
            return Err(RentalError::not_found(format!("service location {}", missing)));
        }

        let id = self.allocate_id();
        self.objects.insert(id, object.with_id(id));
        self.ledgers.insert(id, BookingLedger::new(id, self.policy));
        Ok(id)
    }

    pub fn rental_object(&self, id: i64) -> Option<&RentalObject> {
        self.objects.get(&id)
    }

    pub fn rental_objects(&self) -> impl Iterator<Item = &RentalObject> {
        self.objects.values()
    }

    pub fn add_image(&mut self, rental_object_id: i64, url: &str) -> RentalResult<()> {
        let object = self
            .objects
            .get_mut(&rental_object_id)
            .ok_or_else(|| RentalError::not_found(format!("rental object {}", rental_object_id)))?;
        let image = RentalImage::new(url)?;
        object.add_image(image).map_err(|e| {
            log_validation_error("add_image", "images", url, &e.to_string());
            e
        })
    }

    fn check_booking(&self, booking: &RegistrationBook) -> RentalResult<()> {
        let object = self
            .objects
            .get(&booking.rental_object_id)
            .ok_or_else(|| RentalError::not_found(format!("rental object {}", booking.rental_object_id)))?;
        let locations: Vec<&ServiceLocation> = object
            .locations
            .iter()
            .filter_map(|id| self.locations.get(id))
            .collect();
        check_bookable(object, &locations, booking)
    }

    /// Creates a pending booking after every check passes.
    pub fn book(
        &mut self,
        user_id: i64,
        rental_object_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RentalResult<&RegistrationBook> {
        let booking = RegistrationBook::new(user_id, rental_object_id, start, end)
            .and_then(|booking| self.check_booking(&booking).map(|_| booking))
            .map_err(|e| {
                log_booking_rejected(rental_object_id, user_id, &e.to_string());
                e
            })?;

        let ledger = self.ledger_mut(rental_object_id)?;
        let booking = ledger
            .insert(booking)
            .map_err(|e| {
                log_booking_rejected(rental_object_id, user_id, &e.to_string());
                e
            })?;
        log_booking_event("created", booking.id, rental_object_id, None);
        Ok(booking)
    }

    pub fn confirm(&mut self, rental_object_id: i64, booking_id: Uuid) -> RentalResult<&RegistrationBook> {
        let booking = self.ledger_mut(rental_object_id)?.confirm(booking_id)?;
        log_booking_event("confirmed", booking.id, rental_object_id, None);
        Ok(booking)
    }

    /// Moves a pending booking, re-running the same checks as `book`.
    pub fn reschedule(
        &mut self,
        rental_object_id: i64,
        booking_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RentalResult<&RegistrationBook> {
        let mut moved = self
            .ledgers
            .get(&rental_object_id)
            .and_then(|ledger| ledger.get(booking_id))
            .cloned()
            .ok_or_else(|| RentalError::not_found(format!("booking {}", booking_id)))?;
        moved.reschedule(start, end)?;
        self.check_booking(&moved)?;

        let booking = self.ledger_mut(rental_object_id)?.reschedule(booking_id, start, end)?;
        log_booking_event("rescheduled", booking.id, rental_object_id, None);
        Ok(booking)
    }

    pub fn cancel(&mut self, rental_object_id: i64, booking_id: Uuid) -> RentalResult<RegistrationBook> {
        let booking = self.ledger_mut(rental_object_id)?.cancel(booking_id)?;
        log_booking_event("cancelled", booking.id, rental_object_id, None);
        Ok(booking)
    }

    pub fn bookings_for(&self, rental_object_id: i64) -> RentalResult<&[RegistrationBook]> {
        self.ledgers
            .get(&rental_object_id)
            .map(BookingLedger::bookings)
            .ok_or_else(|| RentalError::not_found(format!("rental object {}", rental_object_id)))
    }

    /// Total price an object would charge for a booking.
    pub fn quote(&self, booking: &RegistrationBook) -> RentalResult<i64> {
        let object = self
            .objects
            .get(&booking.rental_object_id)
            .ok_or_else(|| RentalError::not_found(format!("rental object {}", booking.rental_object_id)))?;
        booking.calculate_total_price(object)
    }

    /// Removes an object with its images and bookings.
    pub fn remove_rental_object(&mut self, id: i64) -> RentalResult<RemovedRentalObject> {
        let object = self
            .objects
            .remove(&id)
            .ok_or_else(|| RentalError::not_found(format!("rental object {}", id)))?;
        let bookings = self
            .ledgers
            .remove(&id)
            .map(|ledger| ledger.bookings().to_vec())
            .unwrap_or_default();
        Ok(RemovedRentalObject { object, bookings })
    }

    fn ledger_mut(&mut self, rental_object_id: i64) -> RentalResult<&mut BookingLedger> {
        self.ledgers
            .get_mut(&rental_object_id)
            .ok_or_else(|| RentalError::not_found(format!("rental object {}", rental_object_id)))
    }
}
