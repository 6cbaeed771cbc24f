use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    Result,
};

/// Outbound messaging port.
///
/// The gatekeeper only ever needs to send one plain-text message to a chat,
/// optionally quoting the message it answers.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageRef>;
}
