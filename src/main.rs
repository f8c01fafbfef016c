//! # lenta_harvest
//!
//! Downloads article metadata from the lenta.ru search API for an arbitrary
//! date range. The search endpoint caps how much one query returns, so the
//! range is split into short windows (one day by default) that are queried
//! one after another; the results are merged into a single table that is
//! checkpointed to disk as the run goes and saved once the range is covered.
//!
//! ## Usage
//!
//! ```sh
//! lenta_harvest --date-from 2019-01-01 --date-to 2019-02-01 --bloc 4
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: YAML file and/or flags resolved into query parameters
//! 2. **Windowing**: The range is cut into consecutive `time_step`-day windows
//! 3. **Fetching**: One GET per window; unusable responses contribute no rows
//! 4. **Output**: Checkpoint every `save_every` windows, final table at the end

use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod harvester;
mod models;
mod outputs;
mod query;
mod utils;
mod windows;

use api::HttpSearchApi;
use cli::Cli;
use config::AppConfig;
use harvester::Harvester;
use utils::{ensure_writable_dir, truncate_for_log};

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = describe_error(e.as_ref());
            error!(error = %message, "Harvest failed");
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}

/// Render an error and its sources with `Display`, outermost first.
fn describe_error(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // thiserror's `#[from]` variants already embed the source text.
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

async fn run(args: Cli) -> Result<(), Box<dyn Error>> {
    let base = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let config = args.apply(base);
    config.validate()?;
    let params = config.search.to_parameters()?;
    if params.date_from > params.date_to {
        return Err(error::HarvestError::InvalidRange {
            from: params.date_from,
            to: params.date_to,
        }
        .into());
    }

    if config.run.save_final {
        ensure_writable_dir(&config.run.output_dir).await?;
    }

    let client = reqwest::Client::builder()
        .user_agent(concat!("lenta_harvest/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let harvester = Harvester::new(
        HttpSearchApi::with_client(client),
        config.search.endpoint.clone(),
        config.run.clone(),
    );
    info!(
        endpoint = %config.search.endpoint,
        time_step = harvester.options().time_step,
        save_every = harvester.options().save_every,
        "Starting harvest"
    );

    let (table, summary) = harvester.run(&params).await?;

    if table.is_empty() {
        warn!("No articles were collected for the requested range");
    }
    for row in table.head(args.preview) {
        let record = serde_json::to_string(&row.record)?;
        info!(index = row.index, record = %truncate_for_log(&record, 300), "Preview");
    }
    if let Some(path) = &summary.final_path {
        info!(path = %path.display(), "Final table saved");
    }
    println!("{}", summary.rows);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use error::HarvestError;

    #[test]
    fn test_describe_error_uses_display_text() {
        let err = HarvestError::InvalidRange {
            from: NaiveDate::from_ymd_opt(2019, 2, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
        };
        assert_eq!(
            describe_error(&err),
            "dateFrom (2019-02-01) should be less than or equal to dateTo (2019-01-01)"
        );
    }

    #[test]
    fn test_describe_error_does_not_repeat_embedded_source() {
        let err = HarvestError::Io(std::io::Error::other("disk full"));
        assert_eq!(describe_error(&err), "I/O error: disk full");
    }
}
