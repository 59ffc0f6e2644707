use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use touchmouse::cli::Cli;
use touchmouse::lifecycle::{CancelToken, Controller, EvdevBackend};

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.resolve().context("invalid configuration")?;

    // Ctrl-C / SIGTERM 只是把标记置位，循环在下一次等待前后退出
    let cancel = CancelToken::new().context("failed to create the cancellation pipe")?;
    let handler = cancel.clone();
    ctrlc::set_handler(move || handler.cancel()).context("failed to install signal handler")?;

    let backend = EvdevBackend {
        grab: config.devices.grab,
    };
    let controller = Controller::new(backend, &config, cancel)?;

    info!("press Ctrl-C to stop");
    controller.run()?;
    Ok(())
}
