use std::sync::Arc;

use anyhow::Context;
use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::{debug, info};

use gatebot_core::{
    config::Config,
    gatekeeper::Gatekeeper,
    messaging::{port::MessagingPort, types::InboundMessage},
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub gatekeeper: Arc<Gatekeeper>,
    pub messenger: Arc<dyn MessagingPort>,
}

/// Validate the token, then long-poll until the process is stopped.
pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let me = bot
        .get_me()
        .await
        .context("telegram client initialization failed (getMe)")?;

    let gatekeeper = Arc::new(Gatekeeper::from_config(&cfg));
    info!(
        username = %me.username(),
        allowed_chat_id = gatekeeper.allowed_chat_id().0,
        "{}",
        startup_banner(&gatekeeper)
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState {
        gatekeeper,
        messenger,
    });

    // Plain text only: bot commands never reach the gatekeeper.
    let handler = Update::filter_message()
        .map(|msg: Message| handlers::inbound_from_message(&msg))
        .filter(|inbound: InboundMessage| !inbound.is_command)
        .endpoint(handlers::handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            debug!(update_id = ?upd.id, "ignoring update with no route");
        })
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn startup_banner(gatekeeper: &Gatekeeper) -> String {
    format!(
        "Telegram bot is now running and will reply '{}' to chat {}",
        gatekeeper.ack_text(),
        gatekeeper.allowed_chat_id()
    )
}
