mod model;

use async_trait::async_trait;
use model::{
    AcknowledgementStorageModel, GroupStorageModel, ReminderStorageModel, encode_times,
    parse_timezone,
};
use pillminder_models::{
    acknowledgement::{Acknowledgement, HISTORY_LIMIT, NewAcknowledgement, TIMESTAMP_FORMAT},
    group::{Group, GroupId},
    reminder::{NewReminder, Reminder, ReminderId},
};

use crate::{ReminderStorage, StorageError};

const REMINDER_COLUMNS: &str = "id, group_id, times, timezone, name";
const ACKNOWLEDGEMENT_COLUMNS: &str = "id, reminder_id, user_id, username, timestamp";

pub struct SqliteReminderStorage {
    pool: sqlx::SqlitePool,
}

impl SqliteReminderStorage {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderStorage for SqliteReminderStorage {
    async fn create_reminder(&self, reminder: NewReminder) -> Result<Reminder, StorageError> {
        let times = encode_times(reminder.times())?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT OR IGNORE INTO groups (chat_id) VALUES (?)")
            .bind(reminder.group_id())
            .execute(&mut *tx)
            .await?;

        let created_reminder = sqlx::query_as::<_, ReminderStorageModel>(&format!(
            "INSERT INTO reminders (group_id, times, timezone, name)
VALUES (?, ?, ?, ?) RETURNING {REMINDER_COLUMNS}"
        ))
        .bind(reminder.group_id())
        .bind(times)
        .bind(reminder.timezone().name())
        .bind(reminder.name())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        created_reminder.try_into()
    }

    async fn get_reminder(&self, id: ReminderId) -> Result<Option<Reminder>, StorageError> {
        let reminder = sqlx::query_as::<_, ReminderStorageModel>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        reminder.map(TryInto::try_into).transpose()
    }

    async fn list_group_reminders(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<Reminder>, StorageError> {
        let reminders = sqlx::query_as::<_, ReminderStorageModel>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE group_id = ? ORDER BY id"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        reminders.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_all_reminders(&self) -> Result<Vec<Reminder>, StorageError> {
        let reminders = sqlx::query_as::<_, ReminderStorageModel>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        reminders.into_iter().map(TryInto::try_into).collect()
    }

    async fn remove_reminder(
        &self,
        id: ReminderId,
        group_id: GroupId,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = ? AND group_id = ?")
            .bind(id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_group(&self, chat_id: GroupId) -> Result<Option<Group>, StorageError> {
        let group = sqlx::query_as::<_, GroupStorageModel>(
            "SELECT chat_id, is_active FROM groups WHERE chat_id = ?",
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group.map(Into::into))
    }

    async fn append_acknowledgement(
        &self,
        acknowledgement: NewAcknowledgement,
    ) -> Result<Acknowledgement, StorageError> {
        let NewAcknowledgement {
            reminder_id,
            acknowledger,
            acknowledged_at,
        } = acknowledgement;

        let timezone: Option<String> =
            sqlx::query_scalar("SELECT timezone FROM reminders WHERE id = ?")
                .bind(reminder_id)
                .fetch_optional(&self.pool)
                .await?;
        let timezone = parse_timezone(&timezone.ok_or(StorageError::NotFound(reminder_id))?)?;

        let timestamp = acknowledged_at
            .with_timezone(&timezone)
            .naive_local()
            .format(TIMESTAMP_FORMAT)
            .to_string();

        // A reminder removed since the lookup fails the foreign key.
        let created_acknowledgement = sqlx::query_as::<_, AcknowledgementStorageModel>(&format!(
            "INSERT INTO acknowledgements (reminder_id, user_id, username, timestamp)
VALUES (?, ?, ?, ?) RETURNING {ACKNOWLEDGEMENT_COLUMNS}"
        ))
        .bind(reminder_id)
        .bind(acknowledger.user_id)
        .bind(acknowledger.username)
        .bind(timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                StorageError::NotFound(reminder_id)
            }
            err => err.into(),
        })?;

        created_acknowledgement.try_into()
    }

    async fn get_history(&self, id: ReminderId) -> Result<Vec<Acknowledgement>, StorageError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM reminders WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StorageError::NotFound(id));
        }

        let history = sqlx::query_as::<_, AcknowledgementStorageModel>(&format!(
            "SELECT {ACKNOWLEDGEMENT_COLUMNS} FROM acknowledgements
WHERE reminder_id = ?
ORDER BY id DESC
LIMIT ?"
        ))
        .bind(id)
        .bind(HISTORY_LIMIT as i64)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        history.into_iter().map(TryInto::try_into).collect()
    }
}
