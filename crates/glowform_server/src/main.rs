use std::process::ExitCode;

use glowform_core::{default_log_level, init_console_logging, init_logging};
use glowform_server::{config::Config, start_server, ServerError};
use log::error;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=server status=error error={err}");
            eprintln!("glowform-server: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ServerError> {
    let config = Config::load()?;

    let level = config
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    let logging = match config.log_dir.as_deref() {
        Some(dir) => init_logging(&level, dir),
        None => init_console_logging(&level),
    };
    logging.map_err(ServerError::Logging)?;
    config.log_summary();

    start_server(config).await
}
