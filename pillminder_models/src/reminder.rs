use std::{fmt, str::FromStr};

use chrono::{NaiveTime, Timelike};
use chrono_tz::Tz;

use crate::{group::GroupId, validation::ValidationError};

pub type ReminderId = i64;

pub const FIRE_TIME_FORMAT: &str = "%H:%M";

/// Time of day a reminder fires at, with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReminderFireTime(NaiveTime);

impl ReminderFireTime {
    pub fn new(inner: NaiveTime) -> Self {
        let normalized_time = inner
            .with_second(0)
            .and_then(|time| time.with_nanosecond(0))
            .expect("Will never fail.");
        Self(normalized_time)
    }

    pub fn time(&self) -> &NaiveTime {
        &self.0
    }

    pub fn into_time(self) -> NaiveTime {
        self.0
    }
}

impl FromStr for ReminderFireTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), FIRE_TIME_FORMAT)
            .map(Self::new)
            .map_err(|_| ValidationError::InvalidTime(s.to_string()))
    }
}

impl fmt::Display for ReminderFireTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(FIRE_TIME_FORMAT))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub id: ReminderId,
    pub group_id: GroupId,
    pub times: Vec<ReminderFireTime>,
    pub timezone: Tz,
    pub name: String,
}

impl Reminder {
    pub fn display_times(&self) -> String {
        self.times
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A reminder that passed validation and is ready to be stored.
///
/// Times keep the order they were given in, repeated times are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReminder {
    group_id: GroupId,
    times: Vec<ReminderFireTime>,
    timezone: Tz,
    name: String,
}

impl NewReminder {
    pub fn new(
        group_id: GroupId,
        times: impl IntoIterator<Item = ReminderFireTime>,
        timezone: Tz,
        name: &str,
    ) -> Result<Self, ValidationError> {
        let mut unique_times = Vec::new();
        for time in times {
            if !unique_times.contains(&time) {
                unique_times.push(time);
            }
        }

        if unique_times.is_empty() {
            return Err(ValidationError::NoTimes);
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        Ok(Self {
            group_id,
            times: unique_times,
            timezone,
            name: name.to_string(),
        })
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn times(&self) -> &[ReminderFireTime] {
        &self.times
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_reminder(self, id: ReminderId) -> Reminder {
        Reminder {
            id,
            group_id: self.group_id,
            times: self.times,
            timezone: self.timezone,
            name: self.name,
        }
    }
}
