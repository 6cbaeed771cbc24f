//! Telegram adapter (teloxide).
//!
//! This crate implements the `gatebot-core` MessagingPort over the Telegram Bot API
//! and wires the gatekeeper into a long-polling dispatcher.

use async_trait::async_trait;

use teloxide::prelude::*;

pub mod handlers;
pub mod router;

use gatebot_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageRef> {
        let mut req = self
            .bot
            .send_message(Self::tg_chat(chat_id), text.to_string());
        if let Some(id) = reply_to {
            req = req.reply_to_message_id(Self::tg_msg_id(id));
        }
        let msg = req.await.map_err(Self::map_err)?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }
}
