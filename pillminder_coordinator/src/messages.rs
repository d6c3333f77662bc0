use pillminder_models::{
    acknowledgement::{Acknowledgement, Acknowledger, HISTORY_LIMIT},
    reminder::Reminder,
};

pub const NO_HISTORY: &str = "📭 No history found";

pub fn reminder_text(reminder: &Reminder) -> String {
    format!("⏰ Reminder: {}", reminder.name)
}

pub fn acknowledged_text(acknowledger: &Acknowledger) -> String {
    format!("✅ Marked as done by {}", acknowledger.display_name())
}

pub fn history_text(history: &[Acknowledgement]) -> String {
    if history.is_empty() {
        return NO_HISTORY.to_string();
    }

    let entries = history
        .iter()
        .map(|entry| {
            format!(
                "⏰ {}\n👤 {}",
                entry.timestamp(),
                entry.acknowledger.display_name()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("📖 Last {HISTORY_LIMIT} entries:\n\n{entries}")
}
