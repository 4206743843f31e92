use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::error::TimestampError;
use crate::util::time::{NormalizeOptions, Zone, is_canonical, local_day_bounds, normalize_to_utc};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeReport {
    pub input: String,
    pub normalized: String,
    /// `false` only for `Z`-suffixed input passed through untouched.
    pub canonical: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub date_from: String,
    pub date_to: String,
}

pub fn normalize(input: &str, options: NormalizeOptions) -> Result<TimeReport, TimestampError> {
    let normalized = normalize_to_utc(input, options)?;
    Ok(TimeReport {
        input: input.to_string(),
        canonical: is_canonical(&normalized),
        normalized,
    })
}

pub fn day_window(date: NaiveDate, zone: Zone) -> Result<DayWindow, TimestampError> {
    let (date_from, date_to) = local_day_bounds(date, zone)?;
    Ok(DayWindow {
        date,
        date_from,
        date_to,
    })
}
