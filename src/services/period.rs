//! Reporting period resolution (month offsets and explicit ranges)

use chrono::{Datelike, Local, NaiveDate};

use crate::types::{DateRange, NippoError, Period, Result};

/// How the caller asked for a period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSpec {
    /// Months relative to the current month (0 = this month, -1 = last month)
    Offset(i32),
    /// Explicit inclusive range, passed through verbatim
    Range { start: NaiveDate, end: NaiveDate },
}

impl Default for PeriodSpec {
    fn default() -> Self {
        Self::Offset(0)
    }
}

impl PeriodSpec {
    /// Build a period request from raw query values.
    ///
    /// `start` and `end` take precedence over `offset` and must come together.
    /// A missing offset means the current month.
    pub fn from_query(
        offset: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self::Range {
                start: parse_date(start)?,
                end: parse_date(end)?,
            }),
            (Some(_), None) | (None, Some(_)) => Err(NippoError::InvalidPeriod(
                "start and end must be given together".into(),
            )),
            (None, None) => match offset.map(str::trim).filter(|s| !s.is_empty()) {
                None => Ok(Self::Offset(0)),
                Some(raw) => raw.parse::<i32>().map(Self::Offset).map_err(|_| {
                    NippoError::InvalidPeriod(format!("offset '{}' is not an integer", raw))
                }),
            },
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| NippoError::InvalidPeriod(format!("'{}' is not a YYYY-MM-DD date", s)))
}

/// Month label in the form "2024年3月"
pub fn month_label(date: NaiveDate) -> String {
    format!("{}年{}月", date.year(), date.month())
}

/// Resolves a [`PeriodSpec`] into concrete dates
pub struct PeriodResolver;

impl PeriodResolver {
    /// Resolve against the local calendar date
    pub fn resolve_now(spec: PeriodSpec) -> Result<Period> {
        Self::resolve(spec, Local::now().date_naive())
    }

    /// Resolve relative to `today`
    pub fn resolve(spec: PeriodSpec, today: NaiveDate) -> Result<Period> {
        match spec {
            PeriodSpec::Offset(offset) => {
                let (start, end) = Self::month_bounds(today, offset)?;
                Ok(Period {
                    start,
                    end,
                    label: month_label(start),
                })
            }
            PeriodSpec::Range { start, end } => {
                let range = DateRange::new(start, end)?;
                Ok(Period {
                    start: range.start,
                    end: range.end,
                    label: month_label(range.start),
                })
            }
        }
    }

    /// First and last day of the month `offset` months away from `today`
    fn month_bounds(today: NaiveDate, offset: i32) -> Result<(NaiveDate, NaiveDate)> {
        let out_of_range = || NippoError::InvalidPeriod(format!("offset {} is out of range", offset));

        let index = i64::from(today.year()) * 12 + i64::from(today.month0()) + i64::from(offset);
        let year = i32::try_from(index.div_euclid(12)).map_err(|_| out_of_range())?;
        let month = index.rem_euclid(12) as u32 + 1;

        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
        let next_month_start = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = next_month_start
            .and_then(|d| d.pred_opt())
            .ok_or_else(out_of_range)?;

        Ok((start, end))
    }
}

impl From<Period> for DateRange {
    fn from(period: Period) -> Self {
        DateRange {
            start: period.start,
            end: period.end,
        }
    }
}
