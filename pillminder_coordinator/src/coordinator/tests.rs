use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use pillminder_models::reminder::ReminderFireTime;
use pillminder_scheduler::{DailyReminderScheduler, MockClock};
use pillminder_storage::InMemoryReminderStorage;

use super::*;

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

const MESSAGE: MessageRef = MessageRef {
    chat_id: 555,
    message_id: 10,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Delivered {
    Sent {
        group_id: GroupId,
        text: String,
        action: ActionToken,
    },
    Edited {
        message: MessageRef,
        text: String,
        action: Option<ActionToken>,
    },
}

#[derive(Default)]
struct TestDeliveryChannel {
    delivered: Mutex<Vec<Delivered>>,
    failing: bool,
}

impl TestDeliveryChannel {
    fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    fn delivered(&self) -> Vec<Delivered> {
        self.delivered.lock().unwrap().clone()
    }

    fn sent_count(&self) -> usize {
        self.delivered()
            .iter()
            .filter(|delivered| matches!(delivered, Delivered::Sent { .. }))
            .count()
    }
}

#[async_trait]
impl ReminderDeliveryChannel for TestDeliveryChannel {
    async fn send_notification(
        &self,
        group_id: GroupId,
        text: &str,
        action: ActionToken,
    ) -> anyhow::Result<()> {
        self.delivered.lock().unwrap().push(Delivered::Sent {
            group_id,
            text: text.to_string(),
            action,
        });

        if self.failing {
            anyhow::bail!("Chat is unreachable");
        }
        Ok(())
    }

    async fn edit_notification(
        &self,
        message: &MessageRef,
        text: &str,
        action: Option<ActionToken>,
    ) -> anyhow::Result<()> {
        self.delivered.lock().unwrap().push(Delivered::Edited {
            message: *message,
            text: text.to_string(),
            action,
        });
        Ok(())
    }
}

struct TestContext {
    storage: Arc<InMemoryReminderStorage>,
    scheduler: Arc<DailyReminderScheduler>,
    delivery: Arc<TestDeliveryChannel>,
    coordinator: ReminderCoordinator,
}

impl TestContext {
    fn new() -> Self {
        Self::with_delivery(TestDeliveryChannel::default())
    }

    fn with_delivery(delivery: TestDeliveryChannel) -> Self {
        Self::with_storage(InMemoryReminderStorage::new(), delivery)
    }

    fn with_storage(storage: InMemoryReminderStorage, delivery: TestDeliveryChannel) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(MockClock::new(utc("2025-06-02T12:00:00Z")));
        let storage = Arc::new(storage);
        let scheduler = Arc::new(DailyReminderScheduler::new(Arc::clone(&clock)));
        let delivery = Arc::new(delivery);
        let coordinator = ReminderCoordinator::new(
            storage.clone(),
            scheduler.clone(),
            delivery.clone(),
            clock,
        );

        Self {
            storage,
            scheduler,
            delivery,
            coordinator,
        }
    }
}

fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn daily_pills(group_id: GroupId, timezone: Tz) -> NewReminder {
    let times = ["08:00", "20:00"].map(|time| time.parse::<ReminderFireTime>().unwrap());
    NewReminder::new(group_id, times, timezone, "Daily Pills").unwrap()
}

fn alice() -> Acknowledger {
    Acknowledger {
        user_id: 1,
        username: Some("alice".to_string()),
    }
}

fn bob() -> Acknowledger {
    Acknowledger {
        user_id: 2,
        username: Some("bob".to_string()),
    }
}

async fn wait(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[tokio::test(start_paused = true)]
async fn adding_reminder_registers_one_job_per_time() {
    let ctx = TestContext::new();

    let reminder = ctx
        .coordinator
        .add_reminder(daily_pills(555, Tz::UTC))
        .await
        .unwrap();

    assert_eq!(
        ctx.scheduler.scheduled_jobs().await,
        vec![
            JobKey::new(reminder.id, "08:00".parse().unwrap()),
            JobKey::new(reminder.id, "20:00".parse().unwrap()),
        ]
    );
    assert_eq!(
        ctx.coordinator.list_reminders(555).await.unwrap(),
        vec![reminder]
    );
}

#[tokio::test(start_paused = true)]
async fn removed_reminder_never_fires() {
    let ctx = TestContext::new();
    let reminder = ctx
        .coordinator
        .add_reminder(daily_pills(555, Tz::UTC))
        .await
        .unwrap();

    let removed = ctx
        .coordinator
        .remove_reminder(reminder.id, 555)
        .await
        .unwrap();
    wait(2 * DAY).await;

    assert_eq!(removed, reminder);
    assert!(ctx.scheduler.scheduled_jobs().await.is_empty());
    assert!(ctx.delivery.delivered().is_empty());
    assert!(ctx.coordinator.list_reminders(555).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn reminder_of_another_group_is_not_removed() {
    let ctx = TestContext::new();
    let reminder = ctx
        .coordinator
        .add_reminder(daily_pills(555, Tz::UTC))
        .await
        .unwrap();

    let result = ctx.coordinator.remove_reminder(reminder.id, 777).await;

    assert!(matches!(result, Err(CoordinatorError::NotFound(id)) if id == reminder.id));
    assert_eq!(ctx.scheduler.scheduled_jobs().await.len(), 2);
    assert!(ctx.storage.get_reminder(reminder.id).await.unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn removing_missing_reminder_is_not_found() {
    let ctx = TestContext::new();

    let result = ctx.coordinator.remove_reminder(42, 555).await;

    assert!(matches!(result, Err(CoordinatorError::NotFound(42))));
}

#[tokio::test(start_paused = true)]
async fn fire_then_acknowledge_updates_message_and_history() {
    let ctx = TestContext::new();
    let reminder = ctx
        .coordinator
        .add_reminder(daily_pills(555, Tz::UTC))
        .await
        .unwrap();
    let id = reminder.id;

    // 12:00 -> 21:00 passes the 20:00 fire only.
    wait(9 * HOUR).await;

    assert_eq!(
        ctx.delivery.delivered(),
        vec![Delivered::Sent {
            group_id: 555,
            text: "⏰ Reminder: Daily Pills".to_string(),
            action: ActionToken::MarkDone(id),
        }]
    );

    ctx.coordinator
        .on_button_pressed(&format!("mark_{id}"), &MESSAGE, alice())
        .await
        .unwrap();

    let delivered = ctx.delivery.delivered();
    assert_eq!(delivered.len(), 2);
    assert_eq!(
        delivered[1],
        Delivered::Edited {
            message: MESSAGE,
            text: "✅ Marked as done by @alice".to_string(),
            action: Some(ActionToken::ShowHistory(id)),
        }
    );

    let history = ctx.coordinator.on_history_request(id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].acknowledger, alice());
    assert_eq!(history[0].timestamp(), "2025-06-02 21:00:00");
}

#[tokio::test(start_paused = true)]
async fn acknowledgement_is_stamped_in_reminder_timezone() {
    let ctx = TestContext::new();
    let reminder = ctx
        .coordinator
        .add_reminder(daily_pills(555, Tz::America__New_York))
        .await
        .unwrap();

    let acknowledgement = ctx
        .coordinator
        .on_acknowledge(reminder.id, &MESSAGE, alice())
        .await
        .unwrap();

    assert_eq!(acknowledgement.timestamp(), "2025-06-02 08:00:00");
}

#[tokio::test(start_paused = true)]
async fn history_button_shows_newest_first() {
    let ctx = TestContext::new();
    let reminder = ctx
        .coordinator
        .add_reminder(daily_pills(555, Tz::UTC))
        .await
        .unwrap();
    let id = reminder.id;

    ctx.coordinator.on_acknowledge(id, &MESSAGE, alice()).await.unwrap();
    wait(HOUR).await;
    ctx.coordinator.on_acknowledge(id, &MESSAGE, bob()).await.unwrap();

    ctx.coordinator
        .on_button_pressed(&format!("history_{id}"), &MESSAGE, alice())
        .await
        .unwrap();

    assert_eq!(
        ctx.delivery.delivered().last(),
        Some(&Delivered::Edited {
            message: MESSAGE,
            text: "📖 Last 20 entries:\n\n\
                   ⏰ 2025-06-02 13:00:00\n👤 @bob\n\n\
                   ⏰ 2025-06-02 12:00:00\n👤 @alice"
                .to_string(),
            action: None,
        })
    );
}

#[tokio::test(start_paused = true)]
async fn empty_history_is_reported_as_such() {
    let ctx = TestContext::new();
    let reminder = ctx
        .coordinator
        .add_reminder(daily_pills(555, Tz::UTC))
        .await
        .unwrap();

    assert!(ctx.coordinator.on_history_request(reminder.id).await.unwrap().is_empty());

    ctx.coordinator
        .on_button_pressed(&format!("history_{}", reminder.id), &MESSAGE, alice())
        .await
        .unwrap();

    assert_eq!(
        ctx.delivery.delivered(),
        vec![Delivered::Edited {
            message: MESSAGE,
            text: "📭 No history found".to_string(),
            action: None,
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn actions_on_missing_reminder_are_not_found() {
    let ctx = TestContext::new();

    assert!(matches!(
        ctx.coordinator.on_history_request(42).await,
        Err(CoordinatorError::NotFound(42))
    ));
    assert!(matches!(
        ctx.coordinator.on_acknowledge(42, &MESSAGE, alice()).await,
        Err(CoordinatorError::NotFound(42))
    ));
    assert!(matches!(
        ctx.coordinator.on_fire(42).await,
        Err(CoordinatorError::NotFound(42))
    ));
    assert!(ctx.delivery.delivered().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_button_is_rejected() {
    let ctx = TestContext::new();

    let result = ctx
        .coordinator
        .on_button_pressed("snooze_1", &MESSAGE, alice())
        .await;

    assert!(matches!(result, Err(CoordinatorError::UnknownAction(token)) if token == "snooze_1"));
    assert!(ctx.delivery.delivered().is_empty());
}

#[tokio::test(start_paused = true)]
async fn job_stops_when_reminder_disappears_behind_its_back() {
    let ctx = TestContext::new();
    let reminder = ctx
        .coordinator
        .add_reminder(daily_pills(555, Tz::UTC))
        .await
        .unwrap();

    ctx.storage.remove_reminder(reminder.id, 555).await.unwrap();
    wait(2 * DAY).await;

    assert!(ctx.delivery.delivered().is_empty());
    assert!(ctx.scheduler.scheduled_jobs().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn delivery_failure_keeps_job_armed() {
    let ctx = TestContext::with_delivery(TestDeliveryChannel::failing());
    ctx.coordinator
        .add_reminder(daily_pills(555, Tz::UTC))
        .await
        .unwrap();

    // 20:00, 08:00, 20:00, 08:00
    wait(2 * DAY).await;

    assert_eq!(ctx.delivery.sent_count(), 4);
    assert_eq!(ctx.scheduler.scheduled_jobs().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn restore_registers_every_stored_time() {
    let storage = InMemoryReminderStorage::new();
    let first = storage
        .create_reminder(daily_pills(555, Tz::UTC))
        .await
        .unwrap();
    let vitamins_time = "12:30".parse::<ReminderFireTime>().unwrap();
    let vitamins = NewReminder::new(777, [vitamins_time], Tz::Asia__Tokyo, "Vitamins").unwrap();
    let second = storage.create_reminder(vitamins).await.unwrap();
    let ctx = TestContext::with_storage(storage, TestDeliveryChannel::default());

    let restored = ctx.coordinator.restore_jobs().await.unwrap();

    assert_eq!(restored, 3);
    assert_eq!(
        ctx.scheduler.scheduled_jobs().await,
        vec![
            JobKey::new(first.id, "08:00".parse().unwrap()),
            JobKey::new(first.id, "20:00".parse().unwrap()),
            JobKey::new(second.id, "12:30".parse().unwrap()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn adding_reminder_after_scheduler_shutdown_is_a_scheduler_error() {
    let ctx = TestContext::new();
    ctx.scheduler.shutdown().await;

    let result = ctx
        .coordinator
        .add_reminder(daily_pills(555, Tz::UTC))
        .await;

    assert!(matches!(result, Err(CoordinatorError::Scheduler(_))));
    assert!(ctx.scheduler.scheduled_jobs().await.is_empty());
}
