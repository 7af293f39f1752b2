//! CF-convention time decoding
//!
//! Parses `units` strings such as `"seconds since 2023-06-01 00:00:00"` and
//! turns numeric offsets into UTC timestamps with nanosecond resolution.
//! Units without a reference (`"seconds"`) are durations and are counted from
//! the Unix epoch.

use crate::errors::{Nc2NaError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

/// Calendars that map onto chrono's proleptic Gregorian calendar
const SUPPORTED_CALENDARS: &[&str] = &["standard", "gregorian", "proleptic_gregorian"];

/// Reference formats tried in order after `T` is normalized to a space
const REFERENCE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Length of one time unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn parse(text: &str) -> Option<Self> {
        let unit = match text.to_ascii_lowercase().as_str() {
            "ns" | "nanosecond" | "nanoseconds" => TimeUnit::Nanoseconds,
            "us" | "microsecond" | "microseconds" => TimeUnit::Microseconds,
            "ms" | "millisecond" | "milliseconds" => TimeUnit::Milliseconds,
            "s" | "sec" | "secs" | "second" | "seconds" => TimeUnit::Seconds,
            "min" | "mins" | "minute" | "minutes" => TimeUnit::Minutes,
            "h" | "hr" | "hrs" | "hour" | "hours" => TimeUnit::Hours,
            "d" | "day" | "days" => TimeUnit::Days,
            _ => return None,
        };
        Some(unit)
    }

    pub fn nanoseconds(&self) -> f64 {
        match self {
            TimeUnit::Nanoseconds => 1.0,
            TimeUnit::Microseconds => 1e3,
            TimeUnit::Milliseconds => 1e6,
            TimeUnit::Seconds => 1e9,
            TimeUnit::Minutes => 60e9,
            TimeUnit::Hours => 3600e9,
            TimeUnit::Days => 86400e9,
        }
    }
}

/// Parsed `units` attribute of a time variable
#[derive(Debug, Clone, PartialEq)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub reference: DateTime<Utc>,
}

impl TimeUnits {
    /// Parses `"<unit> since <reference>"` or a bare `"<unit>"`.
    pub fn parse(units: &str) -> Result<Self> {
        let invalid = |reason: String| Nc2NaError::InvalidTime { reason };
        let trimmed = units.trim();

        let (unit_text, reference) = match trimmed.split_once(" since ") {
            Some((unit, reference)) => (unit.trim(), Some(reference.trim())),
            None => (trimmed, None),
        };

        let unit = TimeUnit::parse(unit_text)
            .ok_or_else(|| invalid(format!("unknown time unit in '{}'", units)))?;
        let reference = match reference {
            Some(text) => parse_reference(text)
                .ok_or_else(|| invalid(format!("failed to parse reference time '{}'", text)))?,
            None => DateTime::UNIX_EPOCH,
        };

        Ok(Self { unit, reference })
    }

    /// Converts one offset to an absolute timestamp.
    pub fn decode_value(&self, value: f64) -> Result<DateTime<Utc>> {
        if !value.is_finite() {
            return Err(Nc2NaError::InvalidTime {
                reason: format!("non-finite time value {}", value),
            });
        }
        let nanos = (value * self.unit.nanoseconds()).round();
        if nanos.abs() >= i64::MAX as f64 {
            return Err(Nc2NaError::InvalidTime {
                reason: format!("time value {} out of range", value),
            });
        }
        self.reference
            .checked_add_signed(TimeDelta::nanoseconds(nanos as i64))
            .ok_or_else(|| Nc2NaError::InvalidTime {
                reason: format!("date overflow adding {} to {}", value, self.reference),
            })
    }

    pub fn decode(&self, values: &[f64]) -> Result<Vec<DateTime<Utc>>> {
        values.iter().map(|&v| self.decode_value(v)).collect()
    }
}

fn parse_reference(text: &str) -> Option<DateTime<Utc>> {
    let mut text = text.trim();
    for suffix in ["UTC", "utc", "Z", "z"] {
        if let Some(stripped) = text.strip_suffix(suffix) {
            text = stripped.trim_end();
            break;
        }
    }
    let normalized = text.replacen('T', " ", 1);

    for format in REFERENCE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Rejects calendars that chrono cannot represent.
pub fn check_calendar(calendar: Option<&str>) -> Result<()> {
    match calendar {
        None => Ok(()),
        Some(name) if SUPPORTED_CALENDARS.contains(&name.trim().to_ascii_lowercase().as_str()) => {
            Ok(())
        }
        Some(name) => Err(Nc2NaError::InvalidTime {
            reason: format!("unsupported calendar '{}'", name),
        }),
    }
}

/// Splits timestamps into the UTC date of the first one and the offsets of
/// all of them, in seconds, from that date's midnight.
pub fn seconds_after_midnight(times: &[DateTime<Utc>]) -> Option<(NaiveDate, Vec<f64>)> {
    let first = times.first()?;
    let day = first.date_naive();
    let midnight = day.and_hms_opt(0, 0, 0)?.and_utc();

    let offsets = times
        .iter()
        .map(|t| {
            let delta = t.signed_duration_since(midnight);
            match delta.num_nanoseconds() {
                Some(ns) => ns as f64 / 1e9,
                None => delta.num_milliseconds() as f64 / 1e3,
            }
        })
        .collect();
    Some((day, offsets))
}
