use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A calendar month, the bucketing unit of the aggregation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

/// Inclusive date range used to select reports by `week_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::validation(format!(
                "Month must be between 1 and 12 (got {month})"
            )));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(AppError::validation(format!("Year {year} is out of range")));
        }
        Ok(Period { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Period {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    /// Build from optional query values; both or neither must be present.
    pub fn from_parts(month: Option<u32>, year: Option<i32>) -> Result<Option<Self>, AppError> {
        match (month, year) {
            (Some(m), Some(y)) => Period::new(y, m).map(Some),
            (None, None) => Ok(None),
            _ => Err(AppError::validation(
                "Month and year must be given together",
            )),
        }
    }

    /// `YYYY-MM`
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    pub fn range(&self) -> DateRange {
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN);
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        let end = next.and_then(|d| d.pred_opt()).unwrap_or(NaiveDate::MAX);
        DateRange { start, end }
    }
}

pub fn current_month_key() -> String {
    Period::current().key()
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if end < start {
            return Err(AppError::validation(format!(
                "Range end {end} is before start {start}"
            )));
        }
        Ok(DateRange { start, end })
    }

    pub fn year(year: i32) -> Result<Self, AppError> {
        let first = Period::new(year, 1)?;
        let last = Period::new(year, 12)?;
        Ok(DateRange {
            start: first.range().start,
            end: last.range().end,
        })
    }

    /// Widest range used for list queries without explicit bounds.
    pub fn unbounded() -> Self {
        DateRange {
            start: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Parse a `YYYY-MM-DD` date, naming the field in the validation message.
pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("{field} must be a date in YYYY-MM-DD form (got {value:?})"))
}
