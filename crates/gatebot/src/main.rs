use std::{process::ExitCode, sync::Arc};

use gatebot_core::{config::Config, Error};
use tokio::runtime::Runtime;

fn main() -> ExitCode {
    if let Err(e) = gatebot_core::logging::init("gatebot") {
        eprintln!("Fatal error: {e}");
        return ExitCode::FAILURE;
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "Fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Error> {
    // `.env` loading mutates the process environment; do it while single-threaded.
    let cfg = Arc::new(Config::load()?);
    let rt = build_runtime()?;

    rt.block_on(gatebot_telegram::router::run_polling(cfg))
        .map_err(|e| Error::External(format!("telegram bot failed: {e:#}")))?;

    Ok(())
}

fn build_runtime() -> Result<Runtime, Error> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::External(format!("failed to start async runtime: {e}")))
}
