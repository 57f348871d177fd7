//! Rental objects, bookings and the in-memory catalog that owns them.

pub mod booking;
pub mod catalog;
pub mod ledger;
pub mod object;

pub use booking::RegistrationBook;
pub use catalog::{check_bookable, RemovedRentalObject, RentalCatalog};
pub use ledger::{BlockingPolicy, BookingLedger};
pub use object::{NewRentalObject, RentalImage, RentalKind, RentalObject};
