use crate::domain::{ChatId, MessageId};

/// Incoming message, already decoded by the messenger adapter.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    /// One-to-one chat with a user (as opposed to a group or channel).
    pub is_private: bool,
    /// `None` for non-text messages (photos, stickers, service messages).
    pub text: Option<String>,
    /// The text opens with a bot command (`/start`, `/help@bot`).
    pub is_command: bool,
}

impl InboundMessage {
    pub fn text(chat_id: ChatId, message_id: MessageId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            message_id,
            is_private: false,
            text: Some(text.into()),
            is_command: false,
        }
    }

    pub fn without_text(chat_id: ChatId, message_id: MessageId) -> Self {
        Self {
            chat_id,
            message_id,
            is_private: false,
            text: None,
            is_command: false,
        }
    }

    pub fn in_private_chat(mut self) -> Self {
        self.is_private = true;
        self
    }

    /// Text content, treating the empty string like absent text.
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Replies quote the triggering message everywhere except private chats.
    pub fn reply_target(&self) -> Option<MessageId> {
        if self.is_private {
            None
        } else {
            Some(self.message_id)
        }
    }
}
