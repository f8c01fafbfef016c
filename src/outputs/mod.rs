//! Writing the accumulated [`ResultTable`] to disk.
//!
//! # Submodules
//!
//! - [`csv`]: Spreadsheet-friendly export, one column per record key
//! - [`json`]: Array of `{ "index", "record" }` objects, lossless
//!
//! Both formats are used for checkpoints and for the final file. Each write
//! replaces the previous file content.
//!
//! # Output Structure
//!
//! ```text
//! <tmp>/checkpoint_table.csv            # overwritten every `save_every` windows
//! <output_dir>/lenta_2019-01-01_2019-02-01.csv
//! ```

pub mod csv;
pub mod json;

use crate::error::Result;
use crate::models::ResultTable;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// On-disk table format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Serialize `table` in `format` and write it to `path`, replacing any existing file.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), rows = table.len()))]
pub async fn write_table(table: &ResultTable, path: &Path, format: OutputFormat) -> Result<()> {
    let bytes = match format {
        OutputFormat::Csv => self::csv::to_csv_bytes(table)?,
        OutputFormat::Json => self::json::to_json_bytes(table)?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, bytes).await?;
    info!(path = %path.display(), rows = table.len(), "Wrote table");
    Ok(())
}

/// Path of the final file for a run over `[from, to]`:
/// `<dir>/<prefix>_<from>_<to>.<ext>`.
pub fn final_output_path(
    dir: &Path,
    prefix: &str,
    from: NaiveDate,
    to: NaiveDate,
    format: OutputFormat,
) -> PathBuf {
    dir.join(format!(
        "{prefix}_{}_{}.{}",
        from.format("%Y-%m-%d"),
        to.format("%Y-%m-%d"),
        format.extension()
    ))
}
