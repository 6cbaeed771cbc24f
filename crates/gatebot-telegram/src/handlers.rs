//! Telegram update handlers.
//!
//! Converts teloxide messages into `InboundMessage` and hands them to the
//! gatekeeper. Anything the gatekeeper returns as an error goes back to the
//! dispatcher's error handler.

use std::sync::Arc;

use teloxide::types::{Message, MessageEntity, MessageEntityKind};

use gatebot_core::{
    domain::{ChatId, MessageId},
    messaging::types::InboundMessage,
    Result,
};

use crate::router::AppState;

pub fn inbound_from_message(msg: &Message) -> InboundMessage {
    let text = msg.text().map(str::to_string);
    let is_command = text.is_some() && starts_with_bot_command(msg.entities().unwrap_or(&[]));

    InboundMessage {
        chat_id: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
        is_private: msg.chat.is_private(),
        text,
        is_command,
    }
}

/// Telegram marks `/cmd` and `/cmd@bot` as a `BotCommand` entity; only one at
/// offset 0 makes the whole message a command.
pub fn starts_with_bot_command(entities: &[MessageEntity]) -> bool {
    entities
        .iter()
        .any(|e| e.offset == 0 && matches!(e.kind, MessageEntityKind::BotCommand))
}

pub async fn handle_message(inbound: InboundMessage, state: Arc<AppState>) -> Result<()> {
    state
        .gatekeeper
        .handle(&inbound, state.messenger.as_ref())
        .await?;
    Ok(())
}
