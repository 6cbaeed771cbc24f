use tracing_subscriber::{fmt, EnvFilter};

use crate::{errors::Error, Result};

/// Initialize logging for the bot.
///
/// Plain-text lines on stdout: timestamp, target, level, message.
/// Records emitted through the `log` facade (teloxide) are bridged in.
pub fn init(service_name: &str) -> Result<()> {
    // Default: info everywhere. Can be overridden with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "info,gatebot_core=info,gatebot_telegram=info,{service_name}=info"
        ))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::io::stdout)
        .try_init()
        .map_err(|e| Error::External(format!("failed to install log subscriber: {e}")))
}
