//! Allow-list check and fixed replies.
//!
//! Every text message gets exactly one reply: the acknowledgment when it comes
//! from the allow-listed chat, the denial otherwise. Messages without text get
//! nothing.

use tracing::warn;

use crate::{
    config::Config,
    domain::{ChatId, MessageId, MessageRef},
    messaging::{port::MessagingPort, types::InboundMessage},
    Result,
};

pub const DEFAULT_ACK_TEXT: &str = "hi from server";
pub const DEFAULT_DENIAL_TEXT: &str = "🚫 Access denied. This bot is private.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied,
}

/// The single message to send back for an inbound event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub chat_id: ChatId,
    /// Message to quote; `None` sends a plain message.
    pub reply_to: Option<MessageId>,
    pub text: String,
    pub verdict: Verdict,
}

pub fn is_authorized(chat_id: ChatId, allowed_chat_id: ChatId) -> bool {
    chat_id == allowed_chat_id
}

#[derive(Clone, Debug)]
pub struct Gatekeeper {
    allowed_chat_id: ChatId,
    ack_text: String,
    denial_text: String,
}

impl Gatekeeper {
    pub fn new(
        allowed_chat_id: ChatId,
        ack_text: impl Into<String>,
        denial_text: impl Into<String>,
    ) -> Self {
        Self {
            allowed_chat_id,
            ack_text: ack_text.into(),
            denial_text: denial_text.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.allowed_chat_id, &cfg.ack_text, &cfg.denial_text)
    }

    pub fn allowed_chat_id(&self) -> ChatId {
        self.allowed_chat_id
    }

    pub fn ack_text(&self) -> &str {
        &self.ack_text
    }

    /// Decide what to send back, without side effects.
    pub fn decide(&self, msg: &InboundMessage) -> Option<Reply> {
        msg.non_empty_text()?;

        let (verdict, text) = if is_authorized(msg.chat_id, self.allowed_chat_id) {
            (Verdict::Allowed, &self.ack_text)
        } else {
            (Verdict::Denied, &self.denial_text)
        };

        Some(Reply {
            chat_id: msg.chat_id,
            reply_to: msg.reply_target(),
            text: text.clone(),
            verdict,
        })
    }

    /// Decide, log denials, and send the reply.
    ///
    /// Send failures are returned as-is; the caller's error boundary owns them.
    pub async fn handle(
        &self,
        msg: &InboundMessage,
        messenger: &dyn MessagingPort,
    ) -> Result<Option<MessageRef>> {
        let Some(reply) = self.decide(msg) else {
            return Ok(None);
        };

        if reply.verdict == Verdict::Denied {
            warn!(
                chat_id = reply.chat_id.0,
                "Unauthorized access attempt from chat ID: {}", reply.chat_id
            );
        }

        let sent = messenger
            .send_text(reply.chat_id, &reply.text, reply.reply_to)
            .await?;
        Ok(Some(sent))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fmt::Write as _,
        sync::{Arc, Mutex},
    };

    use async_trait::async_trait;
    use tracing::{field::Field, Event, Level, Subscriber};
    use tracing_subscriber::{
        layer::{Context, SubscriberExt},
        Layer,
    };

    use super::*;
    use crate::errors::Error;

    const ALLOWED: ChatId = ChatId(-4856306364);

    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<(ChatId, String, Option<MessageId>)>>,
        fail: bool,
    }

    impl RecordingMessenger {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn sent(&self) -> Vec<(ChatId, String, Option<MessageId>)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessagingPort for RecordingMessenger {
        async fn send_text(
            &self,
            chat_id: ChatId,
            text: &str,
            reply_to: Option<MessageId>,
        ) -> Result<MessageRef> {
            if self.fail {
                return Err(Error::External("telegram error: network down".to_string()));
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push((chat_id, text.to_string(), reply_to));
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(sent.len() as i32),
            })
        }
    }

    /// Collects the rendered fields of every WARN event.
    #[derive(Clone, Default)]
    struct WarnCapture(Arc<Mutex<Vec<String>>>);

    impl WarnCapture {
        fn records(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl<S: Subscriber> Layer<S> for WarnCapture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() != Level::WARN {
                return;
            }
            let mut visitor = FieldText::default();
            event.record(&mut visitor);
            self.0.lock().unwrap().push(visitor.0);
        }
    }

    #[derive(Default)]
    struct FieldText(String);

    impl tracing::field::Visit for FieldText {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if !self.0.is_empty() {
                self.0.push(' ');
            }
            let _ = write!(self.0, "{}={:?}", field.name(), value);
        }
    }

    fn gatekeeper() -> Gatekeeper {
        Gatekeeper::new(ALLOWED, DEFAULT_ACK_TEXT, DEFAULT_DENIAL_TEXT)
    }

    fn capture_warnings() -> (WarnCapture, tracing::subscriber::DefaultGuard) {
        let capture = WarnCapture::default();
        let guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));
        (capture, guard)
    }

    fn hello(chat_id: ChatId) -> InboundMessage {
        InboundMessage::text(chat_id, MessageId(100), "hello")
    }

    #[test]
    fn decide_skips_messages_without_text() {
        let gk = gatekeeper();
        assert_eq!(
            gk.decide(&InboundMessage::without_text(ALLOWED, MessageId(1))),
            None
        );
        assert_eq!(
            gk.decide(&InboundMessage::text(ChatId(7), MessageId(2), "")),
            None
        );
    }

    #[test]
    fn decide_picks_reply_by_chat() {
        let gk = gatekeeper();

        let ok = gk.decide(&hello(ALLOWED)).unwrap();
        assert_eq!(ok.verdict, Verdict::Allowed);
        assert_eq!(ok.chat_id, ALLOWED);
        assert_eq!(ok.text, "hi from server");

        let denied = gk.decide(&hello(ChatId(12345))).unwrap();
        assert_eq!(denied.verdict, Verdict::Denied);
        assert_eq!(denied.chat_id, ChatId(12345));
        assert_eq!(denied.text, "🚫 Access denied. This bot is private.");
    }

    #[test]
    fn decide_quotes_the_trigger_in_groups_but_not_in_private_chats() {
        let gk = gatekeeper();

        let group = gk.decide(&hello(ALLOWED)).unwrap();
        assert_eq!(group.reply_to, Some(MessageId(100)));

        let private = gk.decide(&hello(ChatId(12345)).in_private_chat()).unwrap();
        assert_eq!(private.reply_to, None);
    }

    #[test]
    fn from_config_uses_configured_texts() {
        let cfg = Config {
            telegram_bot_token: "123:ABC".to_string(),
            allowed_chat_id: ChatId(5),
            ack_text: "pong".to_string(),
            denial_text: "go away".to_string(),
        };
        let gk = Gatekeeper::from_config(&cfg);
        assert_eq!(gk.allowed_chat_id(), ChatId(5));
        assert_eq!(gk.ack_text(), "pong");
        assert_eq!(gk.decide(&hello(ChatId(6))).unwrap().text, "go away");
    }

    #[tokio::test]
    async fn allowed_chat_gets_ack_without_warning() {
        let (warnings, _guard) = capture_warnings();
        let messenger = RecordingMessenger::default();

        let sent = gatekeeper()
            .handle(&hello(ALLOWED), &messenger)
            .await
            .unwrap();

        assert!(sent.is_some());
        assert_eq!(
            messenger.sent(),
            vec![(ALLOWED, "hi from server".to_string(), Some(MessageId(100)))]
        );
        assert!(warnings.records().is_empty());
    }

    #[tokio::test]
    async fn other_chat_gets_denial_and_one_warning() {
        let (warnings, _guard) = capture_warnings();
        let messenger = RecordingMessenger::default();

        gatekeeper()
            .handle(&hello(ChatId(12345)).in_private_chat(), &messenger)
            .await
            .unwrap();

        assert_eq!(
            messenger.sent(),
            vec![(
                ChatId(12345),
                "🚫 Access denied. This bot is private.".to_string(),
                None
            )]
        );
        let records = warnings.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].contains("12345"));
    }

    #[tokio::test]
    async fn message_without_text_sends_and_logs_nothing() {
        let (warnings, _guard) = capture_warnings();
        let messenger = RecordingMessenger::default();

        let sent = gatekeeper()
            .handle(&InboundMessage::without_text(ALLOWED, MessageId(1)), &messenger)
            .await
            .unwrap();
        gatekeeper()
            .handle(
                &InboundMessage::without_text(ChatId(12345), MessageId(2)),
                &messenger,
            )
            .await
            .unwrap();

        assert_eq!(sent, None);
        assert!(messenger.sent().is_empty());
        assert!(warnings.records().is_empty());
    }

    #[tokio::test]
    async fn same_event_twice_replies_twice() {
        let messenger = RecordingMessenger::default();
        let gk = gatekeeper();
        let msg = hello(ALLOWED);

        gk.handle(&msg, &messenger).await.unwrap();
        gk.handle(&msg, &messenger).await.unwrap();

        let ack = (ALLOWED, "hi from server".to_string(), Some(MessageId(100)));
        assert_eq!(messenger.sent(), vec![ack.clone(), ack]);
    }

    #[tokio::test]
    async fn send_failure_is_returned_to_caller() {
        let messenger = RecordingMessenger::failing();

        let err = gatekeeper()
            .handle(&hello(ALLOWED), &messenger)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::External(ref m) if m.contains("network down")));
    }
}
