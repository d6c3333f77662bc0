use std::sync::Arc;

use async_trait::async_trait;
use pillminder_models::{
    acknowledgement::{Acknowledgement, Acknowledger, NewAcknowledgement},
    group::GroupId,
    reminder::{NewReminder, Reminder, ReminderId},
};
use pillminder_scheduler::{Clock, FireHandler, FireOutcome, JobKey, ReminderScheduler};
use pillminder_storage::ReminderStorage;

use crate::{
    CoordinatorError,
    delivery::{ActionToken, MessageRef, ReminderDeliveryChannel},
    messages,
};

/// Sends the notification of a fired job. Holds no reference to the
/// scheduler, since the scheduler owns it through its jobs.
pub struct FireDispatcher {
    storage: Arc<dyn ReminderStorage>,
    delivery: Arc<dyn ReminderDeliveryChannel>,
}

impl FireDispatcher {
    pub fn new(
        storage: Arc<dyn ReminderStorage>,
        delivery: Arc<dyn ReminderDeliveryChannel>,
    ) -> Self {
        Self { storage, delivery }
    }

    pub async fn dispatch(&self, id: ReminderId) -> Result<(), CoordinatorError> {
        let reminder = self
            .storage
            .get_reminder(id)
            .await?
            .ok_or(CoordinatorError::NotFound(id))?;

        self.delivery
            .send_notification(
                reminder.group_id,
                &messages::reminder_text(&reminder),
                ActionToken::MarkDone(id),
            )
            .await
            .map_err(CoordinatorError::Delivery)
    }
}

#[async_trait]
impl FireHandler for FireDispatcher {
    async fn handle_fire(&self, job: &JobKey) -> FireOutcome {
        match self.dispatch(job.reminder_id).await {
            Ok(()) => FireOutcome::Rearm,
            Err(CoordinatorError::NotFound(id)) => {
                log::warn!("Reminder {id} no longer exists, stopping job {job}");
                FireOutcome::Stop
            }
            Err(error) => {
                log::error!("Failed to deliver reminder for job {job}: {error}");
                FireOutcome::Rearm
            }
        }
    }
}

pub struct ReminderCoordinator {
    storage: Arc<dyn ReminderStorage>,
    scheduler: Arc<dyn ReminderScheduler>,
    delivery: Arc<dyn ReminderDeliveryChannel>,
    clock: Arc<dyn Clock>,
    dispatcher: Arc<FireDispatcher>,
}

impl ReminderCoordinator {
    pub fn new(
        storage: Arc<dyn ReminderStorage>,
        scheduler: Arc<dyn ReminderScheduler>,
        delivery: Arc<dyn ReminderDeliveryChannel>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let dispatcher = Arc::new(FireDispatcher::new(
            Arc::clone(&storage),
            Arc::clone(&delivery),
        ));

        Self {
            storage,
            scheduler,
            delivery,
            clock,
            dispatcher,
        }
    }

    /// Stores the reminder and starts one daily job per fire time.
    pub async fn add_reminder(&self, request: NewReminder) -> Result<Reminder, CoordinatorError> {
        let reminder = self.storage.create_reminder(request).await?;
        self.register_jobs(&reminder).await?;

        log::info!(
            "Added reminder {} for group {} at {} ({})",
            reminder.id,
            reminder.group_id,
            reminder.display_times(),
            reminder.timezone
        );

        Ok(reminder)
    }

    /// Deletes the reminder and cancels its jobs before returning.
    pub async fn remove_reminder(
        &self,
        id: ReminderId,
        group_id: GroupId,
    ) -> Result<Reminder, CoordinatorError> {
        let reminder = self
            .storage
            .get_reminder(id)
            .await?
            .filter(|reminder| reminder.group_id == group_id)
            .ok_or(CoordinatorError::NotFound(id))?;

        if !self.storage.remove_reminder(id, group_id).await? {
            return Err(CoordinatorError::NotFound(id));
        }

        for time in &reminder.times {
            self.scheduler.cancel(&JobKey::new(id, *time)).await;
        }

        log::info!("Removed reminder {id} of group {group_id}");
        Ok(reminder)
    }

    pub async fn list_reminders(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<Reminder>, CoordinatorError> {
        Ok(self.storage.list_group_reminders(group_id).await?)
    }

    /// Registers jobs for every stored reminder. Returns the number of jobs.
    pub async fn restore_jobs(&self) -> Result<usize, CoordinatorError> {
        let reminders = self.storage.list_all_reminders().await?;

        let mut registered = 0;
        for reminder in &reminders {
            registered += self.register_jobs(reminder).await?;
        }

        log::info!(
            "Restored {registered} jobs for {} reminders",
            reminders.len()
        );
        Ok(registered)
    }

    pub async fn on_fire(&self, id: ReminderId) -> Result<(), CoordinatorError> {
        self.dispatcher.dispatch(id).await
    }

    pub async fn on_acknowledge(
        &self,
        id: ReminderId,
        message: &MessageRef,
        acknowledger: Acknowledger,
    ) -> Result<Acknowledgement, CoordinatorError> {
        let acknowledgement = self
            .storage
            .append_acknowledgement(NewAcknowledgement {
                reminder_id: id,
                acknowledger,
                acknowledged_at: self.clock.now(),
            })
            .await?;

        self.delivery
            .edit_notification(
                message,
                &messages::acknowledged_text(&acknowledgement.acknowledger),
                Some(ActionToken::ShowHistory(id)),
            )
            .await
            .map_err(CoordinatorError::Delivery)?;

        Ok(acknowledgement)
    }

    pub async fn on_history_request(
        &self,
        id: ReminderId,
    ) -> Result<Vec<Acknowledgement>, CoordinatorError> {
        Ok(self.storage.get_history(id).await?)
    }

    /// Routes a pressed button by its action token.
    pub async fn on_button_pressed(
        &self,
        token: &str,
        message: &MessageRef,
        acknowledger: Acknowledger,
    ) -> Result<(), CoordinatorError> {
        match token.parse::<ActionToken>()? {
            ActionToken::MarkDone(id) => {
                self.on_acknowledge(id, message, acknowledger).await?;
            }
            ActionToken::ShowHistory(id) => {
                let history = self.on_history_request(id).await?;
                self.delivery
                    .edit_notification(message, &messages::history_text(&history), None)
                    .await
                    .map_err(CoordinatorError::Delivery)?;
            }
        }

        Ok(())
    }

    async fn register_jobs(&self, reminder: &Reminder) -> Result<usize, CoordinatorError> {
        for time in &reminder.times {
            self.scheduler
                .register_daily(
                    JobKey::new(reminder.id, *time),
                    reminder.timezone,
                    self.dispatcher.clone(),
                )
                .await
                .map_err(CoordinatorError::Scheduler)?;
        }

        Ok(reminder.times.len())
    }
}

#[cfg(test)]
mod tests;
