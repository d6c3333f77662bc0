use std::{fmt, str::FromStr};

use async_trait::async_trait;
use pillminder_models::{group::GroupId, reminder::ReminderId};

use crate::CoordinatorError;

const MARK_DONE_PREFIX: &str = "mark_";
const SHOW_HISTORY_PREFIX: &str = "history_";

/// Button attached to a delivered message. Round-trips through its
/// `mark_<id>` / `history_<id>` text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionToken {
    MarkDone(ReminderId),
    ShowHistory(ReminderId),
}

impl ActionToken {
    pub fn reminder_id(&self) -> ReminderId {
        match self {
            ActionToken::MarkDone(id) | ActionToken::ShowHistory(id) => *id,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionToken::MarkDone(_) => "✅ Mark Done",
            ActionToken::ShowHistory(_) => "📖 Show History",
        }
    }
}

impl fmt::Display for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionToken::MarkDone(id) => write!(f, "{MARK_DONE_PREFIX}{id}"),
            ActionToken::ShowHistory(id) => write!(f, "{SHOW_HISTORY_PREFIX}{id}"),
        }
    }
}

impl FromStr for ActionToken {
    type Err = CoordinatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_id = |id: &str| {
            id.parse::<ReminderId>()
                .map_err(|_| CoordinatorError::UnknownAction(s.to_string()))
        };

        if let Some(id) = s.strip_prefix(MARK_DONE_PREFIX) {
            parse_id(id).map(ActionToken::MarkDone)
        } else if let Some(id) = s.strip_prefix(SHOW_HISTORY_PREFIX) {
            parse_id(id).map(ActionToken::ShowHistory)
        } else {
            Err(CoordinatorError::UnknownAction(s.to_string()))
        }
    }
}

/// A previously delivered message that can be edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: GroupId,
    pub message_id: i32,
}

#[async_trait]
pub trait ReminderDeliveryChannel: Send + Sync + 'static {
    async fn send_notification(
        &self,
        group_id: GroupId,
        text: &str,
        action: ActionToken,
    ) -> anyhow::Result<()>;

    async fn edit_notification(
        &self,
        message: &MessageRef,
        text: &str,
        action: Option<ActionToken>,
    ) -> anyhow::Result<()>;
}
