use pillminder_models::{reminder::Reminder, validation::ValidationError};

use crate::commands::CommandError;

pub const HELP: &str = "💊 Pill Reminder Bot\n\n\
📋 Commands:\n\n\
/add_reminder [HH:MM...] [Timezone] \"Reminder Name\"\n\
Example: /add_reminder 08:00 20:00 America/New_York \"Daily Pills\"\n\n\
/show_reminders - List active reminders\n\
/remove_reminder <id> - Delete a reminder\n\n\
Click buttons to mark reminders as done ✅";

pub const GROUP_ONLY: &str = "❌ This command works only in group chats!";
pub const NO_REMINDERS: &str = "🔔 No active reminders";
pub const REMOVE_USAGE: &str = "❌ Usage: /remove_reminder <id>";
pub const REMINDER_GONE: &str = "❌ This reminder no longer exists";
pub const SOMETHING_WENT_WRONG: &str = "❌ Something went wrong, please try again later.";

pub fn reminder_added(reminder: &Reminder) -> String {
    format!(
        "✅ New reminder added:\n\
         🕒 Times: {}\n\
         🌍 Timezone: {}\n\
         📝 Name: {}\n\
         🆔 Id: {}",
        reminder.display_times(),
        reminder.timezone,
        reminder.name,
        reminder.id
    )
}

pub fn reminder_list(reminders: &[Reminder]) -> String {
    if reminders.is_empty() {
        return NO_REMINDERS.to_string();
    }

    let entries = reminders
        .iter()
        .enumerate()
        .map(|(i, reminder)| {
            format!(
                "{}. {} (id {})\n   🕒 {}\n   🌍 {}",
                i + 1,
                reminder.name,
                reminder.id,
                reminder.display_times(),
                reminder.timezone
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("📋 Active Reminders:\n\n{entries}")
}

pub fn reminder_removed(reminder: &Reminder) -> String {
    format!("🗑 Removed reminder: {}", reminder.name)
}

pub fn reminder_not_found(id: &str) -> String {
    format!("❌ Reminder {id} not found in this chat")
}

pub fn command_error(error: &CommandError) -> String {
    match error {
        CommandError::UnbalancedQuotes => "❌ Invalid arguments! Use quotes for names.".to_string(),
        CommandError::Validation(ValidationError::InvalidTime(time)) => {
            format!("❌ Invalid time format: {time}")
        }
        CommandError::Validation(ValidationError::UnknownTimezone(timezone)) => {
            format!("❌ Unknown timezone: {timezone}")
        }
        CommandError::Validation(ValidationError::NoTimes) => {
            "❗ Please specify at least one time!".to_string()
        }
        CommandError::Validation(ValidationError::EmptyName) => {
            "❌ Reminder name must not be empty".to_string()
        }
    }
}
