use std::sync::Arc;

use pillminder_coordinator::{CoordinatorError, ReminderCoordinator};
use pillminder_models::reminder::ReminderId;
use teloxide::prelude::*;

use crate::{
    DefaultTimezone, HandlerResult,
    commands::parse_add_reminder,
    replies,
    util::{acknowledger, is_group_chat, message_ref, try_get_message_from_query},
};

pub(crate) async fn start(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, replies::HELP).await?;
    Ok(())
}

pub(crate) async fn add_reminder(
    args: String,
    bot: Bot,
    coordinator: Arc<ReminderCoordinator>,
    default_timezone: DefaultTimezone,
    msg: Message,
) -> HandlerResult {
    if !is_group_chat(&msg) {
        bot.send_message(msg.chat.id, replies::GROUP_ONLY).await?;
        return Ok(());
    }

    let request = match parse_add_reminder(msg.chat.id.0, &args, default_timezone.0) {
        Ok(request) => request,
        Err(error) => {
            bot.send_message(msg.chat.id, replies::command_error(&error))
                .await?;
            return Ok(());
        }
    };

    let reply = match coordinator.add_reminder(request).await {
        Ok(reminder) => replies::reminder_added(&reminder),
        Err(error) => {
            log::error!("Failed to add reminder in chat {}: {error}", msg.chat.id);
            replies::SOMETHING_WENT_WRONG.to_string()
        }
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

pub(crate) async fn show_reminders(
    bot: Bot,
    coordinator: Arc<ReminderCoordinator>,
    msg: Message,
) -> HandlerResult {
    let reminders = coordinator.list_reminders(msg.chat.id.0).await?;
    bot.send_message(msg.chat.id, replies::reminder_list(&reminders))
        .await?;

    Ok(())
}

pub(crate) async fn remove_reminder(
    args: String,
    bot: Bot,
    coordinator: Arc<ReminderCoordinator>,
    msg: Message,
) -> HandlerResult {
    let Ok(id) = args.trim().parse::<ReminderId>() else {
        bot.send_message(msg.chat.id, replies::REMOVE_USAGE).await?;
        return Ok(());
    };

    let reply = match coordinator.remove_reminder(id, msg.chat.id.0).await {
        Ok(reminder) => replies::reminder_removed(&reminder),
        Err(CoordinatorError::NotFound(_)) => replies::reminder_not_found(args.trim()),
        Err(error) => {
            log::error!("Failed to remove reminder {id} in chat {}: {error}", msg.chat.id);
            replies::SOMETHING_WENT_WRONG.to_string()
        }
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

pub(crate) async fn button_pressed(
    bot: Bot,
    coordinator: Arc<ReminderCoordinator>,
    query: CallbackQuery,
) -> HandlerResult {
    let data = query.data.clone().unwrap_or_default();
    let message = try_get_message_from_query(&query).map(message_ref);
    let user = acknowledger(&query.from);

    let Some(message) = message else {
        log::warn!("Button {data} pressed on an inaccessible message");
        bot.answer_callback_query(query.id).await?;
        return Ok(());
    };

    match coordinator.on_button_pressed(&data, &message, user).await {
        Ok(()) => {
            bot.answer_callback_query(query.id).await?;
        }
        Err(CoordinatorError::NotFound(id)) => {
            log::info!("Button {data} pressed for missing reminder {id}");
            bot.answer_callback_query(query.id)
                .text(replies::REMINDER_GONE)
                .show_alert(true)
                .await?;
        }
        Err(error) => {
            log::error!("Failed to handle button {data}: {error}");
            bot.answer_callback_query(query.id).await?;
        }
    }

    Ok(())
}
