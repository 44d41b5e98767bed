use clap::Parser;
use finman::args::{Args, Command};
use finman::{commands, Config, Error, ErrorType, Mode, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with {} error: {e}", e.error_type());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().finman_home().path();

    // This allows for running the rate commands without network access or an API key. When
    // FINMAN_OFFLINE_RATES is set and non-zero in length, then the mode will be Mode::Offline,
    // otherwise it will be Mode::Live.
    let mode = Mode::from_env();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.api_key()).await?.print(),

        Command::Add(add_args) => commands::add(load(home).await?, add_args.clone())
            .await?
            .print(),

        Command::List(filter_args) => commands::list(load(home).await?, filter_args.clone())
            .await?
            .print(),

        Command::Dashboard(dashboard_args) => {
            commands::dashboard(load(home).await?, dashboard_args.clone())
                .await?
                .print()
        }

        Command::Rates(rate_args) => commands::rates(load(home).await?, mode, rate_args.clone())
            .await?
            .print(),

        Command::Convert(convert_args) => {
            commands::convert(load(home).await?, mode, convert_args.clone())
                .await?
                .print()
        }

        Command::Watch(watch_args) => {
            commands::watch(load(home).await?, mode, watch_args.clone())
                .await?
                .print()
        }
    };
    Ok(())
}

async fn load(home: &Path) -> Result<Config> {
    Config::load(home)
        .await
        .map_err(|e| Error::new(ErrorType::Config, e))
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
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
