use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::SubsecRound;
use tokio::sync::RwLock;

use pillminder_models::{
    acknowledgement::{Acknowledgement, AcknowledgementId, HISTORY_LIMIT, NewAcknowledgement},
    group::{Group, GroupId},
    reminder::{NewReminder, Reminder, ReminderId},
};

use crate::{ReminderStorage, StorageError};

#[derive(Default)]
struct InMemoryStore {
    last_reminder_id: ReminderId,
    last_acknowledgement_id: AcknowledgementId,
    groups: BTreeMap<GroupId, Group>,
    reminders: BTreeMap<ReminderId, Reminder>,
    acknowledgements: Vec<Acknowledgement>,
}

/// Process-local storage. Every call holds the store lock for its whole
/// duration, which makes each mutation atomic.
#[derive(Default)]
pub struct InMemoryReminderStorage {
    store: RwLock<InMemoryStore>,
}

impl InMemoryReminderStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReminderStorage for InMemoryReminderStorage {
    async fn create_reminder(&self, reminder: NewReminder) -> Result<Reminder, StorageError> {
        let mut store = self.store.write().await;
        let group_id = reminder.group_id();
        store.groups.entry(group_id).or_insert(Group {
            chat_id: group_id,
            is_active: true,
        });

        store.last_reminder_id += 1;
        let reminder = reminder.into_reminder(store.last_reminder_id);
        store.reminders.insert(reminder.id, reminder.clone());

        log::debug!("Stored reminder {} for group {}", reminder.id, group_id);
        Ok(reminder)
    }

    async fn get_reminder(&self, id: ReminderId) -> Result<Option<Reminder>, StorageError> {
        let store = self.store.read().await;
        Ok(store.reminders.get(&id).cloned())
    }

    async fn list_group_reminders(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<Reminder>, StorageError> {
        let store = self.store.read().await;
        Ok(store
            .reminders
            .values()
            .filter(|reminder| reminder.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn list_all_reminders(&self) -> Result<Vec<Reminder>, StorageError> {
        let store = self.store.read().await;
        Ok(store.reminders.values().cloned().collect())
    }

    async fn remove_reminder(
        &self,
        id: ReminderId,
        group_id: GroupId,
    ) -> Result<bool, StorageError> {
        let mut store = self.store.write().await;
        let owned = store
            .reminders
            .get(&id)
            .is_some_and(|reminder| reminder.group_id == group_id);

        if owned {
            store.reminders.remove(&id);
            store
                .acknowledgements
                .retain(|acknowledgement| acknowledgement.reminder_id != id);
        }

        Ok(owned)
    }

    async fn get_group(&self, chat_id: GroupId) -> Result<Option<Group>, StorageError> {
        let store = self.store.read().await;
        Ok(store.groups.get(&chat_id).copied())
    }

    async fn append_acknowledgement(
        &self,
        acknowledgement: NewAcknowledgement,
    ) -> Result<Acknowledgement, StorageError> {
        let mut store = self.store.write().await;
        let reminder_id = acknowledgement.reminder_id;
        let timezone = store
            .reminders
            .get(&reminder_id)
            .map(|reminder| reminder.timezone)
            .ok_or(StorageError::NotFound(reminder_id))?;

        store.last_acknowledgement_id += 1;
        let acknowledgement = Acknowledgement {
            id: store.last_acknowledgement_id,
            reminder_id,
            acknowledger: acknowledgement.acknowledger,
            local_time: acknowledgement
                .acknowledged_at
                .with_timezone(&timezone)
                .naive_local()
                .trunc_subsecs(0),
        };
        store.acknowledgements.push(acknowledgement.clone());

        Ok(acknowledgement)
    }

    async fn get_history(&self, id: ReminderId) -> Result<Vec<Acknowledgement>, StorageError> {
        let store = self.store.read().await;
        if !store.reminders.contains_key(&id) {
            return Err(StorageError::NotFound(id));
        }

        Ok(store
            .acknowledgements
            .iter()
            .rev()
            .filter(|acknowledgement| acknowledgement.reminder_id == id)
            .take(HISTORY_LIMIT)
            .cloned()
            .collect())
    }
}
