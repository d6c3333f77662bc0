mod commands;
mod delivery;
mod handlers;
mod replies;
mod util;

pub use delivery::TelegramDeliveryChannel;
pub use teloxide;

use std::sync::Arc;

use chrono_tz::Tz;
use commands::Command;
use pillminder_coordinator::ReminderCoordinator;
use teloxide::{dptree::case, prelude::*};

type HandlerResult = anyhow::Result<()>;

/// Timezone for `/add_reminder` calls that do not name one.
#[derive(Clone, Copy, Debug)]
pub struct DefaultTimezone(pub Tz);

pub struct TelegramInteractionInterface;
impl TelegramInteractionInterface {
    pub async fn start(
        bot: Bot,
        coordinator: Arc<ReminderCoordinator>,
        default_timezone: DefaultTimezone,
    ) {
        log::info!("Starting Telegram interaction interface");

        let command_handler = Update::filter_message().branch(
            teloxide::filter_command::<Command, _>()
                .branch(case![Command::Start].endpoint(handlers::start))
                .branch(case![Command::AddReminder(args)].endpoint(handlers::add_reminder))
                .branch(case![Command::ShowReminders].endpoint(handlers::show_reminders))
                .branch(case![Command::RemoveReminder(args)].endpoint(handlers::remove_reminder)),
        );

        let callback_handler = Update::filter_callback_query().endpoint(handlers::button_pressed);

        let schema = dptree::entry()
            .branch(command_handler)
            .branch(callback_handler);

        Dispatcher::builder(bot, schema)
            .dependencies(dptree::deps![coordinator, default_timezone])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await
    }
}
