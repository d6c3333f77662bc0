use pillminder_coordinator::delivery::MessageRef;
use pillminder_models::acknowledgement::Acknowledger;
use teloxide::types::{CallbackQuery, MaybeInaccessibleMessage, Message, User};

pub fn try_get_message_from_query(query: &CallbackQuery) -> Option<&Message> {
    query.message.as_ref().and_then(|msg| match msg {
        MaybeInaccessibleMessage::Inaccessible(_) => None,
        MaybeInaccessibleMessage::Regular(message) => Some(message.as_ref()),
    })
}

pub fn is_group_chat(message: &Message) -> bool {
    message.chat.is_group() || message.chat.is_supergroup()
}

pub fn message_ref(message: &Message) -> MessageRef {
    MessageRef {
        chat_id: message.chat.id.0,
        message_id: message.id.0,
    }
}

pub fn acknowledger(user: &User) -> Acknowledger {
    Acknowledger {
        user_id: user.id.0 as i64,
        username: user.username.clone(),
    }
}
