use async_trait::async_trait;
use pillminder_coordinator::delivery::{ActionToken, MessageRef, ReminderDeliveryChannel};
use pillminder_models::group::GroupId;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId},
};

pub struct TelegramDeliveryChannel {
    bot: Bot,
}

impl TelegramDeliveryChannel {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ReminderDeliveryChannel for TelegramDeliveryChannel {
    async fn send_notification(
        &self,
        group_id: GroupId,
        text: &str,
        action: ActionToken,
    ) -> anyhow::Result<()> {
        self.bot
            .send_message(ChatId(group_id), text)
            .reply_markup(keyboard_markup(action))
            .await?;

        Ok(())
    }

    async fn edit_notification(
        &self,
        message: &MessageRef,
        text: &str,
        action: Option<ActionToken>,
    ) -> anyhow::Result<()> {
        let request = self.bot.edit_message_text(
            ChatId(message.chat_id),
            MessageId(message.message_id),
            text,
        );

        match action {
            Some(action) => {
                request.reply_markup(keyboard_markup(action)).await?;
            }
            None => {
                request.await?;
            }
        }

        Ok(())
    }
}

fn keyboard_markup(action: ActionToken) -> InlineKeyboardMarkup {
    let button = InlineKeyboardButton::callback(action.label(), action.to_string());
    InlineKeyboardMarkup::new(vec![vec![button]])
}
