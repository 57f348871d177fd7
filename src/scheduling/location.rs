use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{RentalError, RentalResult};
use crate::scheduling::window::WeeklySchedule;
use crate::scheduling::work_day::WorkDay;
use crate::utils::datetime::weekday_name;
use crate::utils::validation::{validate_capacity, validate_coordinates, validate_location_name};

/// A physical place where rental objects are handed out.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceLocation {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub city: String,
    pub rest_of_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity: u32,
    available_days: Vec<WorkDay>,
    #[serde(skip)]
    schedule: WeeklySchedule,
}

/// Fields needed to register a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewServiceLocation {
    pub name: String,
    pub description: String,
    pub city: String,
    pub rest_of_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity: u32,
}

impl NewServiceLocation {
    pub fn new(name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            city: city.into(),
            rest_of_address: String::new(),
            latitude: None,
            longitude: None,
            capacity: 1,
        }
    }

    pub fn validate(&self) -> RentalResult<()> {
        validate_location_name(&self.name).map_err(|e| RentalError::validation(e.to_string()))?;
        validate_capacity(self.capacity).map_err(|e| RentalError::validation(e.to_string()))?;
        validate_coordinates(self.latitude, self.longitude)
            .map_err(|e| RentalError::validation(e.to_string()))?;
        Ok(())
    }
}

impl ServiceLocation {
    pub fn new(fields: NewServiceLocation) -> RentalResult<Self> {
        fields.validate()?;

        Ok(Self {
            id: None,
            name: fields.name,
            description: fields.description,
            city: fields.city,
            rest_of_address: fields.rest_of_address,
            latitude: fields.latitude,
            longitude: fields.longitude,
            capacity: fields.capacity,
            available_days: Vec::new(),
            schedule: WeeklySchedule::default(),
        })
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn available_days(&self) -> &[WorkDay] {
        &self.available_days
    }

    /// Attaches a window. Returns `false` if the location already had it.
    pub fn add_work_day(&mut self, work_day: WorkDay) -> bool {
        if self.available_days.iter().any(|d| d.key() == work_day.key()) {
            return false;
        }
        self.available_days.push(work_day);
        self.rebuild_schedule();
        true
    }

    pub fn remove_work_day(&mut self, work_day: &WorkDay) -> bool {
        let before = self.available_days.len();
        self.available_days.retain(|d| d.key() != work_day.key());
        let removed = self.available_days.len() != before;
        if removed {
            self.rebuild_schedule();
        }
        removed
    }

    fn rebuild_schedule(&mut self) {
        self.schedule = WeeklySchedule::from_work_days(&self.available_days);
    }

    /// Explains why `date`/`time` is not bookable.
    ///
    /// A location without any windows is open around the clock. Once a window
    /// exists, a weekday without windows is `NotFound`, and a time outside every
    /// window of that weekday is a `Validation` failure.
    pub fn check_available(&self, date: NaiveDate, time: NaiveTime) -> RentalResult<()> {
        if self.available_days.is_empty() {
            return Ok(());
        }

        let weekday = date.weekday();
        let day = self.schedule.day(weekday);
        if day.is_empty() {
            return Err(RentalError::not_found(format!(
                "{} has no working hours on {}",
                self.name,
                weekday_name(weekday)
            )));
        }

        if !day.contains(time) {
            return Err(RentalError::validation(format!(
                "{} is closed at {} on {}",
                self.name,
                time.format("%H:%M"),
                weekday_name(weekday)
            )));
        }

        Ok(())
    }

    pub fn is_available(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.check_available(date, time).is_ok()
    }

    pub fn address(&self) -> String {
        [self.city.as_str(), self.rest_of_address.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn geo(&self) -> String {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => format!("{}, {}", lat, lon),
            _ => "-".to_string(),
        }
    }

    pub fn working_hours(&self) -> String {
        let mut days: Vec<&WorkDay> = self.available_days.iter().collect();
        days.sort_by_key(|d| (d.day_index(), d.start_time, d.end_time));
        days.iter()
            .map(|d| d.hours_label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ServiceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.city)
    }
}
