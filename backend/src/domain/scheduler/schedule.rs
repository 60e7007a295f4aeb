//! Wall-clock schedules for background jobs.

use std::fmt;

use chrono::{DateTime, NaiveTime, TimeDelta, Timelike, Utc};

/// Validation errors for schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// Minute past the hour was 60 or more.
    Minute(u32),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minute(value) => write!(f, "minute {value} must be between 0 and 59"),
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Time-of-day trigger evaluated in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Once a day at the given time.
    Daily {
        /// Time of day.
        at: NaiveTime,
    },
    /// Once an hour at the given minute.
    Hourly {
        /// Minute past the hour, `0..60`.
        minute: u32,
    },
}

impl Schedule {
    /// Every day at `at`.
    pub const fn daily_at(at: NaiveTime) -> Self {
        Self::Daily { at }
    }

    /// Every day at 00:00 UTC.
    pub const fn midnight() -> Self {
        Self::Daily { at: NaiveTime::MIN }
    }

    /// Every hour at `minute` past.
    pub fn hourly_at(minute: u32) -> Result<Self, ScheduleError> {
        if minute >= 60 {
            return Err(ScheduleError::Minute(minute));
        }
        Ok(Self::Hourly { minute })
    }

    /// First trigger strictly after `now`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use eatwhatnow::domain::Schedule;
    ///
    /// let now = Utc.with_ymd_and_hms(2024, 5, 1, 13, 20, 0).unwrap();
    /// let next = Schedule::hourly_at(0).unwrap().next_after(now);
    /// assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap());
    /// ```
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            Self::Daily { at } => {
                let today = now.date_naive().and_time(at).and_utc();
                if today > now {
                    today
                } else {
                    today + TimeDelta::days(1)
                }
            }
            Self::Hourly { minute } => {
                let this_hour = now
                    .date_naive()
                    .and_hms_opt(now.hour(), minute, 0)
                    .map(|slot| slot.and_utc());
                match this_hour {
                    Some(slot) if slot > now => slot,
                    Some(slot) => slot + TimeDelta::hours(1),
                    None => now + TimeDelta::hours(1),
                }
            }
        }
    }

    /// Time to wait from `now` until the next trigger.
    pub fn delay_after(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.next_after(now) - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily { at } => write!(f, "daily at {} UTC", at.format("%H:%M")),
            Self::Hourly { minute } => write!(f, "hourly at minute {minute}"),
        }
    }
}
