use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::scheduling::work_day::WorkDay;
use crate::utils::datetime::weekday_index;

/// Closed time-of-day interval; `None` bounds extend to the start or end of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl TimeWindow {
    pub fn from_bounds(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start.map_or(true, |start| time >= start) && self.end.map_or(true, |end| time <= end)
    }

    fn ends_before(&self, time: NaiveTime) -> bool {
        self.end.is_some_and(|end| end < time)
    }

    /// Whether `other` (starting no earlier than `self`) overlaps or touches `self`.
    fn reaches(&self, other: &TimeWindow) -> bool {
        match (self.end, other.start) {
            (None, _) | (_, None) => true,
            (Some(end), Some(start)) => start <= end,
        }
    }

    fn later_end(a: Option<NaiveTime>, b: Option<NaiveTime>) -> Option<NaiveTime> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        }
    }
}

/// Sorted, pairwise disjoint windows for a single weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    windows: Vec<TimeWindow>,
}

impl DaySchedule {
    /// Merges overlapping or touching windows into a disjoint set.
    pub fn from_windows(mut windows: Vec<TimeWindow>) -> Self {
        // None sorts before Some, so open starts come first
        windows.sort_by_key(|w| w.start);

        let mut merged: Vec<TimeWindow> = Vec::with_capacity(windows.len());
        for window in windows {
            match merged.last_mut() {
                Some(last) if last.reaches(&window) => {
                    last.end = TimeWindow::later_end(last.end, window.end);
                }
                _ => merged.push(window),
            }
        }

        Self { windows: merged }
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn windows(&self) -> &[TimeWindow] {
        &self.windows
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        // First window whose end is not before `time`; disjoint windows keep ends sorted.
        let idx = self.windows.partition_point(|w| w.ends_before(time));
        self.windows.get(idx).is_some_and(|w| w.contains(time))
    }
}

/// Working hours for a whole week, indexed Monday = 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    days: [DaySchedule; 7],
}

impl WeeklySchedule {
    pub fn from_work_days<'a>(work_days: impl IntoIterator<Item = &'a WorkDay>) -> Self {
        let mut buckets: [Vec<TimeWindow>; 7] = Default::default();
        for work_day in work_days {
            buckets[work_day.day_index() as usize].push(work_day.window());
        }

        Self {
            days: buckets.map(DaySchedule::from_windows),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(DaySchedule::is_empty)
    }

    pub fn day(&self, day: Weekday) -> &DaySchedule {
        &self.days[weekday_index(day) as usize]
    }
}
