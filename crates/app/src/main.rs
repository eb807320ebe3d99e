//! apicheck - Main Entry Point

use std::process::ExitCode;

use apicheck::cli::{Cli, Commands};
use apicheck::{Outcome, commands, logging};
use apicheck_application::CancellationToken;
use clap::Parser;
use tracing::warn;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_level.as_deref()) {
        eprintln!("error: {e:#}");
        return ExitCode::from(Outcome::ERROR_CODE);
    }

    let cancel = CancellationToken::new();
    let receiver = cancel.receiver();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling run");
            cancel.cancel();
        }
    });

    let result = match &cli.command {
        Commands::Run(args) => commands::run(cli.config.as_deref(), args, receiver).await,
        Commands::List(args) => commands::list(args).await,
    };

    match result {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(Outcome::ERROR_CODE)
        }
    }
}
