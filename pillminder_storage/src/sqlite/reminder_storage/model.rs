use chrono::NaiveDateTime;
use chrono_tz::Tz;
use pillminder_models::{
    acknowledgement::{Acknowledgement, Acknowledger, TIMESTAMP_FORMAT},
    group::Group,
    reminder::{Reminder, ReminderFireTime},
};

use crate::StorageError;

#[derive(sqlx::FromRow)]
pub struct GroupStorageModel {
    pub chat_id: i64,
    pub is_active: bool,
}

impl From<GroupStorageModel> for Group {
    fn from(value: GroupStorageModel) -> Self {
        Self {
            chat_id: value.chat_id,
            is_active: value.is_active,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct ReminderStorageModel {
    pub id: i64,
    pub group_id: i64,
    pub times: String,
    pub timezone: String,
    pub name: String,
}

impl TryFrom<ReminderStorageModel> for Reminder {
    type Error = StorageError;

    fn try_from(value: ReminderStorageModel) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            group_id: value.group_id,
            times: decode_times(&value.times)?,
            timezone: parse_timezone(&value.timezone)?,
            name: value.name,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct AcknowledgementStorageModel {
    pub id: i64,
    pub reminder_id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub timestamp: String,
}

impl TryFrom<AcknowledgementStorageModel> for Acknowledgement {
    type Error = StorageError;

    fn try_from(value: AcknowledgementStorageModel) -> Result<Self, Self::Error> {
        let local_time = NaiveDateTime::parse_from_str(&value.timestamp, TIMESTAMP_FORMAT)
            .map_err(|e| {
                StorageError::InvalidRecord(format!(
                    "timestamp {:?} of acknowledgement {}: {e}",
                    value.timestamp, value.id
                ))
            })?;

        Ok(Self {
            id: value.id,
            reminder_id: value.reminder_id,
            acknowledger: Acknowledger {
                user_id: value.user_id,
                username: value.username,
            },
            local_time,
        })
    }
}

/// Times are kept as a JSON array of `HH:MM` strings.
pub fn encode_times(times: &[ReminderFireTime]) -> Result<String, StorageError> {
    let times: Vec<String> = times.iter().map(ToString::to_string).collect();
    serde_json::to_string(&times).map_err(|e| StorageError::InvalidRecord(e.to_string()))
}

pub fn decode_times(times: &str) -> Result<Vec<ReminderFireTime>, StorageError> {
    let raw: Vec<String> = serde_json::from_str(times)
        .map_err(|e| StorageError::InvalidRecord(format!("times {times:?}: {e}")))?;

    raw.iter()
        .map(|time| {
            time.parse::<ReminderFireTime>()
                .map_err(|e| StorageError::InvalidRecord(format!("times {times:?}: {e}")))
        })
        .collect()
}

pub fn parse_timezone(timezone: &str) -> Result<Tz, StorageError> {
    timezone
        .parse()
        .map_err(|_| StorageError::InvalidRecord(format!("unknown timezone {timezone:?}")))
}
