use async_trait::async_trait;
use thiserror::Error;

use pillminder_models::{
    acknowledgement::{Acknowledgement, NewAcknowledgement},
    group::{Group, GroupId},
    reminder::{NewReminder, Reminder, ReminderId},
};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Reminder {0} does not exist")]
    NotFound(ReminderId),

    #[error("Stored record is invalid: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Durable reminders, their groups and acknowledgement logs.
///
/// Every mutating call is atomic: it is either fully applied or not at all.
#[async_trait]
pub trait ReminderStorage: Send + Sync {
    /// Stores the reminder, creating its group on first use.
    async fn create_reminder(&self, reminder: NewReminder) -> Result<Reminder, StorageError>;

    async fn get_reminder(&self, id: ReminderId) -> Result<Option<Reminder>, StorageError>;

    /// Reminders of one group in ascending id order.
    async fn list_group_reminders(&self, group_id: GroupId)
    -> Result<Vec<Reminder>, StorageError>;

    async fn list_all_reminders(&self) -> Result<Vec<Reminder>, StorageError>;

    /// Deletes the reminder only when it belongs to `group_id`.
    ///
    /// `false` covers both a missing reminder and one owned by another group.
    async fn remove_reminder(&self, id: ReminderId, group_id: GroupId)
    -> Result<bool, StorageError>;

    async fn get_group(&self, chat_id: GroupId) -> Result<Option<Group>, StorageError>;

    /// Logs an acknowledgement with a timestamp local to the reminder's timezone.
    async fn append_acknowledgement(
        &self,
        acknowledgement: NewAcknowledgement,
    ) -> Result<Acknowledgement, StorageError>;

    /// Newest acknowledgements first, at most [`HISTORY_LIMIT`] of them.
    ///
    /// [`HISTORY_LIMIT`]: pillminder_models::acknowledgement::HISTORY_LIMIT
    async fn get_history(&self, id: ReminderId) -> Result<Vec<Acknowledgement>, StorageError>;
}
