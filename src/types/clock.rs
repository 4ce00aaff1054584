//! Wall-clock time of day as written on a daily report (`HH:MM`)

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use super::{NippoError, Result};

/// Minutes in one day
pub const MINUTES_PER_DAY: i64 = 24 * 60;

fn clock_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid regex"))
}

/// A validated time of day, stored as minutes since midnight.
///
/// `24:00` is accepted as an end-of-day alias and is stored as 1440.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self> {
        if minute > 59 || hour > 24 || (hour == 24 && minute != 0) {
            return Err(NippoError::InvalidTime(format!("{:02}:{:02}", hour, minute)));
        }
        Ok(Self((hour * 60 + minute) as u16))
    }

    /// Minutes since midnight (0..=1440)
    pub fn minutes(self) -> i64 {
        i64::from(self.0)
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0) / 60
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0) % 60
    }
}

impl FromStr for ClockTime {
    type Err = NippoError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let caps = clock_pattern()
            .captures(trimmed)
            .ok_or_else(|| NippoError::InvalidTime(s.to_string()))?;
        // Both groups are ASCII digits of bounded length
        let hour: u32 = caps[1]
            .parse()
            .map_err(|_| NippoError::InvalidTime(s.to_string()))?;
        let minute: u32 = caps[2]
            .parse()
            .map_err(|_| NippoError::InvalidTime(s.to_string()))?;
        Self::from_hm(hour, minute).map_err(|_| NippoError::InvalidTime(s.to_string()))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
