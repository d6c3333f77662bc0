pub type GroupId = i64;

/// A chat that owns reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    pub chat_id: GroupId,
    pub is_active: bool,
}
