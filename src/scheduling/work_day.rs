use std::fmt;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{RentalError, RentalResult};
use crate::scheduling::window::TimeWindow;
use crate::utils::datetime::{format_time_bound, parse_time, weekday_from_index, weekday_index, weekday_name};

/// Working hours for one weekday. A missing bound leaves that side open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDay {
    pub id: Option<i64>,
    pub day: Weekday,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl WorkDay {
    /// Builds a window, rejecting a start later than the end.
    pub fn new(
        day: Weekday,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
    ) -> RentalResult<Self> {
        if let (Some(start), Some(end)) = (start_time, end_time) {
            if start > end {
                return Err(RentalError::validation(format!(
                    "Work day start {} is after end {}",
                    start.format("%H:%M"),
                    end.format("%H:%M")
                )));
            }
        }

        Ok(Self {
            id: None,
            day,
            start_time,
            end_time,
        })
    }

    pub fn from_index(
        index: u8,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
    ) -> RentalResult<Self> {
        let day = weekday_from_index(index)
            .ok_or_else(|| RentalError::validation(format!("Weekday index {} is not in 0-6", index)))?;
        Self::new(day, start_time, end_time)
    }

    /// Builds a window from `HH:MM` text; a blank bound is left open.
    pub fn parse(index: u8, start: &str, end: &str) -> RentalResult<Self> {
        let bound = |text: &str| -> RentalResult<Option<NaiveTime>> {
            if text.trim().is_empty() {
                return Ok(None);
            }
            parse_time(text)
                .map(Some)
                .map_err(|e| RentalError::validation(e.to_string()))
        };
        Self::from_index(index, bound(start)?, bound(end)?)
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn day_index(&self) -> u8 {
        weekday_index(self.day)
    }

    pub fn is_time_available(&self, time: NaiveTime) -> bool {
        if self.start_time.is_some_and(|start| time < start) {
            return false;
        }
        if self.end_time.is_some_and(|end| time > end) {
            return false;
        }
        true
    }

    /// Uniqueness key for the configured set of windows.
    pub fn key(&self) -> (u8, Option<NaiveTime>, Option<NaiveTime>) {
        (self.day_index(), self.start_time, self.end_time)
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::from_bounds(self.start_time, self.end_time)
    }

    /// `Monday 08:00-19:00`, the form used in working-hours listings.
    pub fn hours_label(&self) -> String {
        format!(
            "{} {}-{}",
            weekday_name(self.day),
            format_time_bound(self.start_time),
            format_time_bound(self.end_time)
        )
    }
}

impl fmt::Display for WorkDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} {}",
            format_time_bound(self.start_time),
            format_time_bound(self.end_time),
            weekday_name(self.day)
        )
    }
}
