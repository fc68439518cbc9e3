use clap::Parser;
use splitwise_export::args::Args;
use splitwise_export::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Malformed --from_date or --to_date values are reported by clap here, before any other work.
    // clap exits with status 2 in that case.
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");

    // This allows for testing the program without hitting the Splitwise API. When
    // SPLITWISE_EXPORT_IN_TEST_MODE is set and non-zero in length, then the mode will be
    // Mode::Testing, otherwise it will be Mode::Splitwise.
    let mode = Mode::from_env();

    let config = Config::load(args.common().env_file()).await?;
    trace!("{config:?}");

    commands::export(&config, mode, args.export()).await?.print();
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
