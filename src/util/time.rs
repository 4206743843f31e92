use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    SecondsFormat, TimeZone, Utc,
};
use regex::Regex;
use serde::Deserialize;

use crate::domain::error::TimestampError;

static CANONICAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("valid canonical timestamp regex")
});

/// Wall-clock layouts produced by date/time form inputs, tried in order.
const WALL_CLOCK_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Layouts carrying an explicit numeric offset (`+01:00`, `-0530`).
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];

/// Offset source used to read a wall-clock value as an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The runtime's local zone, DST included.
    #[default]
    System,
    Fixed(FixedOffset),
}

impl Zone {
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Resolve a local wall-clock reading to UTC. A repeated hour resolves to
    /// its earlier instant, a skipped hour is rejected.
    fn resolve(self, wall: NaiveDateTime, input: &str) -> Result<DateTime<Utc>, TimestampError> {
        match self {
            Self::System => earliest_utc(Local.from_local_datetime(&wall), input),
            Self::Fixed(offset) => earliest_utc(offset.from_local_datetime(&wall), input),
        }
    }
}

impl FromStr for Zone {
    type Err = TimestampError;

    /// Accepts `local`, `Z`, `UTC`, `±HH`, `±HHMM` and `±HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "local" | "system" => Ok(Self::System),
            "Z" | "z" | "UTC" | "utc" => Ok(Self::utc()),
            _ => parse_fixed_offset(trimmed)
                .map(Self::Fixed)
                .ok_or_else(|| TimestampError::malformed(s, "invalid UTC offset")),
        }
    }
}

fn parse_fixed_offset(input: &str) -> Option<FixedOffset> {
    let (sign, rest) = match input.as_bytes().first()? {
        b'+' => (1, &input[1..]),
        b'-' => (-1, &input[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (
            digits[..2].parse::<i32>().ok()?,
            digits[2..].parse::<i32>().ok()?,
        ),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn earliest_utc<Tz: TimeZone>(
    resolved: LocalResult<DateTime<Tz>>,
    input: &str,
) -> Result<DateTime<Utc>, TimestampError> {
    match resolved {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // `Local` does not order the two candidates by instant.
        LocalResult::Ambiguous(a, b) => Ok(a.with_timezone(&Utc).min(b.with_timezone(&Utc))),
        LocalResult::None => Err(TimestampError::malformed(
            input,
            "local time does not exist in this zone",
        )),
    }
}

/// Treatment of strings that carry a numeric offset other than `Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExplicitOffset {
    /// The string is absolute; convert it straight to UTC.
    #[default]
    Honor,
    /// Drop the offset and read the remaining wall clock in the zone.
    WallClock,
}

impl FromStr for ExplicitOffset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "honor" => Ok(Self::Honor),
            "wall-clock" | "wall_clock" => Ok(Self::WallClock),
            other => Err(format!("unknown explicit offset policy `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeOptions {
    pub zone: Zone,
    pub explicit_offset: ExplicitOffset,
}

impl NormalizeOptions {
    pub fn in_zone(zone: Zone) -> Self {
        Self {
            zone,
            ..Self::default()
        }
    }
}

/// A date/time value about to be sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampInput<'a> {
    /// Text as typed or produced by a form input.
    Text(&'a str),
    /// Local wall-clock reading without offset.
    WallClock(NaiveDateTime),
    /// Already an absolute instant.
    Instant(DateTime<Utc>),
}

impl<'a> From<&'a str> for TimestampInput<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for TimestampInput<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value.as_str())
    }
}

impl From<NaiveDateTime> for TimestampInput<'_> {
    fn from(value: NaiveDateTime) -> Self {
        Self::WallClock(value)
    }
}

impl From<DateTime<Utc>> for TimestampInput<'_> {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Instant(value)
    }
}

/// Convert a local date/time into the canonical `YYYY-MM-DDTHH:mm:ssZ` wire form.
///
/// Text already ending in `Z` is returned unchanged without being parsed.
/// Anything else is read as a wall clock in `options.zone` (explicit numeric
/// offsets follow `options.explicit_offset`), shifted to UTC, and printed with
/// fractional seconds dropped.
pub fn normalize_to_utc<'a>(
    input: impl Into<TimestampInput<'a>>,
    options: NormalizeOptions,
) -> Result<String, TimestampError> {
    let instant = match input.into() {
        TimestampInput::Text(text) => {
            if text.ends_with('Z') {
                return Ok(text.to_string());
            }
            parse_text(text, options)?
        }
        TimestampInput::WallClock(wall) => options.zone.resolve(wall, &wall.to_string())?,
        TimestampInput::Instant(instant) => instant,
    };
    Ok(format_canonical(instant))
}

fn parse_text(input: &str, options: NormalizeOptions) -> Result<DateTime<Utc>, TimestampError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimestampError::malformed(input, "empty timestamp"));
    }

    if let Some(absolute) = parse_with_offset(trimmed) {
        return match options.explicit_offset {
            ExplicitOffset::Honor => Ok(absolute.with_timezone(&Utc)),
            ExplicitOffset::WallClock => options.zone.resolve(absolute.naive_local(), input),
        };
    }

    let wall = parse_wall_clock(trimmed)
        .ok_or_else(|| TimestampError::malformed(input, "not a recognized date/time"))?;
    options.zone.resolve(wall, input)
}

fn parse_with_offset(input: &str) -> Option<DateTime<FixedOffset>> {
    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(input, format).ok())
}

fn parse_wall_clock(input: &str) -> Option<NaiveDateTime> {
    WALL_CLOCK_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

fn format_canonical(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Whether `input` is exactly `YYYY-MM-DDTHH:mm:ssZ`.
pub fn is_canonical(input: &str) -> bool {
    CANONICAL_RE.is_match(input)
}

/// Canonical bounds of one local calendar day: 00:00:00 and 23:59:59.
pub fn local_day_bounds(day: NaiveDate, zone: Zone) -> Result<(String, String), TimestampError> {
    let label = day.to_string();
    let start = zone.resolve(day.and_time(NaiveTime::MIN), &label)?;
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    let end = zone.resolve(day.and_time(last_second), &label)?;
    Ok((format_canonical(start), format_canonical(end)))
}

/// Today's date as seen from `zone`.
pub fn today_in(zone: Zone) -> NaiveDate {
    match zone {
        Zone::System => Local::now().date_naive(),
        Zone::Fixed(offset) => Utc::now().with_timezone(&offset).date_naive(),
    }
}
