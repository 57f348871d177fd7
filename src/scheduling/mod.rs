//! Working hours and location availability.

pub mod location;
pub mod window;
pub mod work_day;

pub use location::{NewServiceLocation, ServiceLocation};
pub use window::{DaySchedule, TimeWindow, WeeklySchedule};
pub use work_day::WorkDay;
