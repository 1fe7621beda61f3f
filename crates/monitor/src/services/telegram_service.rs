use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::info;

use super::{AlertDispatcher, DispatchError};

pub struct TelegramDispatcher {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramDispatcher {
    pub fn new(token: &str, chat_id: i64) -> Self {
        Self {
            bot: Bot::new(token),
            chat_id: ChatId(chat_id),
        }
    }
}

#[async_trait]
impl AlertDispatcher for TelegramDispatcher {
    async fn send(&self, symbol: &str, subject: &str, body: &str) -> Result<(), DispatchError> {
        self.bot
            .send_message(self.chat_id, format!("{}\n\n{}", subject, body))
            .await?;
        info!("Telegram alert sent for {}", symbol);
        Ok(())
    }
}
