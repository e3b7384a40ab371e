use crate::error::CoreError;
use chrono::{NaiveTime, Timelike};
use std::str::FromStr;

const MINUTES_PER_DAY: i32 = 24 * 60;

/// A local wall-clock time as recorded in the journal (`HH:MM` or `HH:MM:SS`).
///
/// Only the hour and minute take part in hold-time arithmetic; seconds are
/// accepted on input and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self, CoreError> {
        if hour > 23 || minute > 59 {
            return Err(CoreError::InvalidInput(
                "time of day".to_string(),
                format!("{hour:02}:{minute:02} is out of range"),
            ));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Minutes elapsed since midnight.
    pub fn minute_of_day(&self) -> i32 {
        (self.hour * 60 + self.minute) as i32
    }

    /// Minutes from `self` (open) to `close`, wrapping past midnight when the
    /// close is earlier than the open. A position is never held 24h or more.
    pub fn minutes_until(&self, close: TimeOfDay) -> u32 {
        let mut diff = close.minute_of_day() - self.minute_of_day();
        if diff < 0 {
            diff += MINUTES_PER_DAY;
        }
        diff as u32
    }
}

impl FromStr for TimeOfDay {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map_err(|e| CoreError::InvalidInput("time of day".to_string(), format!("'{s}': {e}")))?;
        Self::new(parsed.hour(), parsed.minute())
    }
}

/// Hold duration in minutes for a pair of optional journal times.
///
/// Returns `None` when either side is missing or unparseable.
pub fn hold_minutes(opened: Option<&str>, closed: Option<&str>) -> Option<u32> {
    let open: TimeOfDay = opened?.parse().ok()?;
    let close: TimeOfDay = closed?.parse().ok()?;
    Some(open.minutes_until(close))
}
