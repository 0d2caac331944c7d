mod app;
mod cache;
mod cli;
mod config;
mod consts;
mod core;
mod costs;
mod error;
mod logging;
mod output;
mod source;
mod utils;

use clap::Parser;

use app::CommandContext;
use cli::Cli;
use config::Config;
use crate::core::DateFilter;
use error::{AppError, ReportError};
use utils::{Timezone, parse_date};

fn build_context<'a>(cli: &'a Cli, config: &'a Config) -> Result<CommandContext<'a>, AppError> {
    let since = cli.since.as_deref().map(parse_date).transpose()?;
    let until = cli.until.as_deref().map(parse_date).transpose()?;
    let timezone = Timezone::parse(cli.timezone.as_deref())?;
    Ok(CommandContext {
        cli,
        config,
        filter: DateFilter::new(since, until),
        timezone,
    })
}

fn main() {
    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let cli = cli.with_config(&config);

    logging::init(cli.debug, cli.is_machine_output(), cli.use_color());
    if let Some(path) = &config.path {
        tracing::info!("Loaded config from {}", path.display());
    }
    for warning in &config.warnings {
        tracing::warn!("{warning}");
    }

    let result = build_context(&cli, &config).and_then(|ctx| app::run(&ctx));
    match result {
        Ok(()) => {}
        Err(AppError::Report(ReportError::NoData)) => {
            println!("No completed or processing orders found; nothing to report yet.");
        }
        Err(e) => {
            eprintln!("Error: {e}");
            if e.is_retryable() {
                eprintln!("An input source could not be read; try again later.");
            }
            std::process::exit(1);
        }
    }
}
