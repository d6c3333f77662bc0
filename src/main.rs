mod appsettings;
mod health;

use std::sync::Arc;

use anyhow::ensure;
use pillminder_coordinator::ReminderCoordinator;
use pillminder_scheduler::{Clock, DailyReminderScheduler, SystemClock, clock::resolve_timezone};
use pillminder_storage::{
    ReminderStorage,
    sqlite::{self, reminder_storage::SqliteReminderStorage},
};
use pillminder_telegram::{DefaultTimezone, TelegramDeliveryChannel, TelegramInteractionInterface};
use teloxide::Bot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = appsettings::load()?;
    ensure!(
        !settings.telegram.token.trim().is_empty(),
        "Telegram token is not configured"
    );
    let default_timezone = resolve_timezone(&settings.reminders.default_timezone)?;

    let pool = sqlite::connect(&settings.database.url).await?;
    let storage: Arc<dyn ReminderStorage> = Arc::new(SqliteReminderStorage::new(pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scheduler = Arc::new(DailyReminderScheduler::new(Arc::clone(&clock)));

    let bot = Bot::new(settings.telegram.token.clone());
    let delivery = Arc::new(TelegramDeliveryChannel::new(bot.clone()));
    let coordinator = Arc::new(ReminderCoordinator::new(
        storage,
        scheduler.clone(),
        delivery,
        clock,
    ));

    let restored = coordinator.restore_jobs().await?;
    log::info!("Restored {restored} reminder jobs");

    let listener = health::bind(settings.health.port).await?;
    tokio::spawn(async move {
        if let Err(error) = health::serve(listener).await {
            log::error!("Health endpoint stopped: {error}");
        }
    });

    TelegramInteractionInterface::start(bot, coordinator, DefaultTimezone(default_timezone)).await;
    scheduler.shutdown().await;

    Ok(())
}
