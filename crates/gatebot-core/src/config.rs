use std::{env, fmt, fs, path::Path};

use crate::{
    domain::ChatId,
    errors::Error,
    gatekeeper::{DEFAULT_ACK_TEXT, DEFAULT_DENIAL_TEXT},
    Result,
};

/// Typed configuration for the bot.
#[derive(Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    /// The only chat that receives the acknowledgment reply.
    pub allowed_chat_id: ChatId,
    pub ack_text: String,
    pub denial_text: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_bot_token", &"[REDACTED]")
            .field("allowed_chat_id", &self.allowed_chat_id)
            .field("ack_text", &self.ack_text)
            .field("denial_text", &self.denial_text)
            .finish()
    }
}

impl Config {
    /// Load from the process environment, after applying `./.env` if present.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
            })?
            .trim()
            .to_string();

        let raw_chat_id = lookup("TELEGRAM_ALLOWED_CHAT_ID")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config(
                    "TELEGRAM_ALLOWED_CHAT_ID environment variable is required".to_string(),
                )
            })?;
        let allowed_chat_id = raw_chat_id.trim().parse::<i64>().map(ChatId).map_err(|e| {
            Error::Config(format!(
                "TELEGRAM_ALLOWED_CHAT_ID must be an integer chat id, got {raw_chat_id:?}: {e}"
            ))
        })?;

        let ack_text = lookup("BOT_ACK_TEXT")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_ACK_TEXT.to_string());
        let denial_text = lookup("BOT_DENIAL_TEXT")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_DENIAL_TEXT.to_string());

        Ok(Self {
            telegram_bot_token,
            allowed_chat_id,
            ack_text,
            denial_text,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
