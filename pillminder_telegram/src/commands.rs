use chrono_tz::Tz;
use pillminder_models::{
    group::GroupId,
    reminder::{NewReminder, ReminderFireTime},
    validation::ValidationError,
};
use pillminder_scheduler::clock::resolve_timezone;
use teloxide::macros::BotCommands;
use thiserror::Error;

pub const DEFAULT_REMINDER_NAME: &str = "Medication Reminder";

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "snake_case",
    description = "These commands are supported:"
)]
pub(crate) enum Command {
    #[command(description = "show help")]
    Start,
    #[command(description = "add a reminder: HH:MM [HH:MM...] [Timezone] \"Name\"")]
    AddReminder(String),
    #[command(description = "list reminders of this chat")]
    ShowReminders,
    #[command(description = "remove a reminder by its id")]
    RemoveReminder(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unbalanced quotes in arguments")]
    UnbalancedQuotes,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, PartialEq, Eq)]
struct Argument {
    text: String,
    quoted: bool,
}

/// Parses `/add_reminder` arguments: fire times, an optional trailing
/// timezone and an optional quoted name.
pub fn parse_add_reminder(
    group_id: GroupId,
    args: &str,
    default_timezone: Tz,
) -> Result<NewReminder, CommandError> {
    let mut arguments = split_arguments(args).ok_or(CommandError::UnbalancedQuotes)?;

    let name = match arguments
        .iter()
        .rposition(|argument| argument.quoted || argument.text.contains(char::is_whitespace))
    {
        Some(index) => arguments.remove(index).text,
        None => DEFAULT_REMINDER_NAME.to_string(),
    };

    let timezone = match arguments.last().map(|argument| resolve_timezone(&argument.text)) {
        Some(Ok(timezone)) => {
            arguments.pop();
            timezone
        }
        _ => default_timezone,
    };

    let times = arguments
        .iter()
        .map(|argument| argument.text.parse::<ReminderFireTime>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NewReminder::new(group_id, times, timezone, &name)?)
}

/// Splits on whitespace, keeping single- or double-quoted runs together.
/// A backslash escapes the next character outside single quotes.
fn split_arguments(input: &str) -> Option<Vec<Argument>> {
    let mut arguments = Vec::new();
    let mut current: Option<Argument> = None;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some('"') | None, '\\') => {
                let escaped = chars.next()?;
                current
                    .get_or_insert_with(empty_argument)
                    .text
                    .push(escaped);
            }
            (Some(_), c) => current.get_or_insert_with(empty_argument).text.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                current.get_or_insert_with(empty_argument).quoted = true;
            }
            (None, c) if c.is_whitespace() => arguments.extend(current.take()),
            (None, c) => current.get_or_insert_with(empty_argument).text.push(c),
        }
    }

    if quote.is_some() {
        return None;
    }

    arguments.extend(current);
    Some(arguments)
}

fn empty_argument() -> Argument {
    Argument {
        text: String::new(),
        quoted: false,
    }
}
