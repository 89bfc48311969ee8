use std::process::ExitCode;

use log::error;
use sftp_sync_tester::{AppConfig, Cli, CliOutcome, dispatch, setup_logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::parse_args(std::env::args_os()) {
        CliOutcome::Parsed(cli) => cli,
        CliOutcome::ShowHelp => {
            Cli::print_help();
            return ExitCode::SUCCESS;
        }
        CliOutcome::Informational(e) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        CliOutcome::Invalid(e) => {
            let _ = e.print();
            Cli::print_help();
            return ExitCode::SUCCESS;
        }
    };

    let mut app_config = match AppConfig::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let logger = match setup_logging(&app_config) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to set up logging: {:?}", e);
            return ExitCode::FAILURE;
        }
    };

    match dispatch(cli, &mut app_config, &logger).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(logger: &logger, "{}", e);
            for failure in e.failures() {
                error!(logger: &logger, "  {}", failure);
            }
            ExitCode::FAILURE
        }
    }
}
