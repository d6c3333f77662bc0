use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("At least one reminder time is required")]
    NoTimes,

    #[error("Reminder name must not be empty")]
    EmptyName,
}
