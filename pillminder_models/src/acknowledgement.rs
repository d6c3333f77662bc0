use chrono::{DateTime, NaiveDateTime, Utc};

use crate::reminder::ReminderId;

pub type UserId = i64;
pub type AcknowledgementId = i64;

/// Most acknowledgements returned for a single reminder.
pub const HISTORY_LIMIT: usize = 20;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The user that pressed the acknowledgement button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledger {
    pub user_id: UserId,
    pub username: Option<String>,
}

impl Acknowledger {
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(username) => format!("@{username}"),
            None => format!("user {}", self.user_id),
        }
    }
}

pub struct NewAcknowledgement {
    pub reminder_id: ReminderId,
    pub acknowledger: Acknowledger,
    pub acknowledged_at: DateTime<Utc>,
}

/// A logged acknowledgement. `local_time` is the wall clock of the
/// reminder's timezone at the moment it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub id: AcknowledgementId,
    pub reminder_id: ReminderId,
    pub acknowledger: Acknowledger,
    pub local_time: NaiveDateTime,
}

impl Acknowledgement {
    pub fn timestamp(&self) -> String {
        self.local_time.format(TIMESTAMP_FORMAT).to_string()
    }
}
