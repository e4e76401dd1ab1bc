//! Date-window resolution for reports and transaction listings.
//!
//! A [`RangeQuery`] maps a mode plus optional parameters to a half-open UTC
//! window `[start, end)`. All modes resolve to whole calendar days.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// How the caller wants the window resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeMode {
    /// The current day.
    Today,
    /// A single day, `date` if given, otherwise the current day.
    Day,
    /// The current day plus the seven days before it.
    SevenDays,
    /// A calendar month, defaulting to the current one.
    Month,
    /// A calendar year, defaulting to the current one.
    Year,
    /// An explicit inclusive date range; both bounds required.
    Range,
}

impl RangeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Day => "day",
            Self::SevenDays => "seven_days",
            Self::Month => "month",
            Self::Year => "year",
            Self::Range => "range",
        }
    }
}

/// Parameters of a date-window request.
///
/// Which fields are read depends on [`RangeQuery::mode`]; the rest are
/// ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RangeQuery {
    pub mode: Option<RangeMode>,
    pub date: Option<NaiveDate>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RangeQuery {
    /// Resolve the query into `[start, end)` relative to `today`.
    ///
    /// `today` is passed in rather than read from the clock so the resolution
    /// stays a pure function.
    pub fn resolve(&self, today: NaiveDate) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
        let mode = self.mode.ok_or_else(|| {
            EngineError::InvalidRange("mode is required".to_string())
        })?;

        match mode {
            RangeMode::Today => Ok(day_window(today)),
            RangeMode::Day => Ok(day_window(self.date.unwrap_or(today))),
            RangeMode::SevenDays => {
                let start = today
                    .checked_sub_days(Days::new(7))
                    .ok_or_else(|| EngineError::InvalidRange("date out of range".to_string()))?;
                Ok((start_of_day(start), start_of_day(next_day(today)?)))
            }
            RangeMode::Month => {
                let month = self.month.unwrap_or_else(|| today.month());
                let year = self.year.unwrap_or_else(|| today.year());
                month_window(month, year)
            }
            RangeMode::Year => year_window(self.year.unwrap_or_else(|| today.year())),
            RangeMode::Range => {
                let (Some(start), Some(end)) = (self.start_date, self.end_date) else {
                    return Err(EngineError::InvalidRange(
                        "start_date and end_date are required for range mode".to_string(),
                    ));
                };
                if start > end {
                    return Err(EngineError::InvalidRange(
                        "start_date must be <= end_date".to_string(),
                    ));
                }
                Ok((start_of_day(start), start_of_day(next_day(end)?)))
            }
        }
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn next_day(date: NaiveDate) -> ResultEngine<NaiveDate> {
    date.checked_add_days(Days::new(1))
        .ok_or_else(|| EngineError::InvalidRange("date out of range".to_string()))
}

/// `[midnight, midnight + 1 day)` for a single day.
pub(crate) fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(date);
    (start, start + chrono::Duration::days(1))
}

fn month_window(month: u32, year: i32) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| EngineError::InvalidRange(format!("invalid month: {month}")))?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| EngineError::InvalidRange("date out of range".to_string()))?;
    Ok((start_of_day(start), start_of_day(end)))
}

fn year_window(year: i32) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| EngineError::InvalidRange(format!("invalid year: {year}")))?;
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)
        .ok_or_else(|| EngineError::InvalidRange("date out of range".to_string()))?;
    Ok((start_of_day(start), start_of_day(end)))
}
