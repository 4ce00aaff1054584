//! Splits one work session into normal, overtime and late-night hours
//!
//! Sessions are handled in minutes since midnight of the report date. A
//! session whose end is not after its start crosses midnight, so its end is
//! shifted by one day. Both windows are fixed in those same coordinates: the
//! late-night window runs from 22:00 to 05:00 of the following morning.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{ClockTime, MINUTES_PER_DAY};

/// Regular working hours, 08:00-17:00
pub const NORMAL_WINDOW: (i64, i64) = (8 * 60, 17 * 60);

/// Late-night hours, 22:00-05:00 of the following morning
pub const LATE_NIGHT_WINDOW: (i64, i64) = (22 * 60, 29 * 60);

/// Hour split of a single session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub normal_minutes: i64,
    pub overtime_minutes: i64,
    /// Subset of `overtime_minutes`
    pub late_night_minutes: i64,
    pub is_sunday: bool,
}

impl Classification {
    pub fn duration_minutes(&self) -> i64 {
        self.normal_minutes + self.overtime_minutes
    }

    pub fn normal_hours(&self) -> Decimal {
        minutes_to_hours(self.normal_minutes)
    }

    pub fn overtime_hours(&self) -> Decimal {
        minutes_to_hours(self.overtime_minutes)
    }

    pub fn late_night_hours(&self) -> Decimal {
        minutes_to_hours(self.late_night_minutes)
    }
}

/// Convert whole minutes to exact decimal hours
pub fn minutes_to_hours(minutes: i64) -> Decimal {
    Decimal::from(minutes) / Decimal::from(60)
}

/// Stateless session classifier
pub struct TimeIntervalClassifier;

impl TimeIntervalClassifier {
    /// Classify the session `[start, end)` worked on `date`
    pub fn classify(date: NaiveDate, start: ClockTime, end: ClockTime) -> Classification {
        let is_sunday = date.weekday() == Weekday::Sun;
        if start == end {
            return Classification {
                is_sunday,
                ..Default::default()
            };
        }
        let (start, end) = Self::session_bounds(start, end);
        let duration = end - start;

        let normal = overlap(start, end, NORMAL_WINDOW);
        let late_night = overlap(start, end, LATE_NIGHT_WINDOW);

        Classification {
            normal_minutes: normal,
            overtime_minutes: duration - normal,
            late_night_minutes: late_night,
            is_sunday,
        }
    }

    /// Session bounds in minutes, with `end` shifted past midnight when it is
    /// not after `start`. Callers handle identical start and end first.
    fn session_bounds(start: ClockTime, end: ClockTime) -> (i64, i64) {
        // 24:00 as a start time is the next midnight
        let start = start.minutes() % MINUTES_PER_DAY;
        let mut end = end.minutes();
        if end <= start {
            end += MINUTES_PER_DAY;
        }
        (start, end)
    }
}

fn overlap(start: i64, end: i64, window: (i64, i64)) -> i64 {
    (end.min(window.1) - start.max(window.0)).max(0)
}
