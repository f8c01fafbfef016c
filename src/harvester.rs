//! The windowed fetch loop.
//!
//! A run walks the requested date range one [`SearchWindow`] at a time, in
//! chronological order, issuing exactly one request per window and appending
//! whatever rows come back to a single [`ResultTable`]. Every `save_every`
//! windows the whole table is written to the checkpoint path (replacing the
//! previous checkpoint); at the end it is optionally written to a file named
//! after the requested range.
//!
//! ```text
//!             ┌──────────── next window ────────────┐
//!             ▼                                     │
//!   ──▶ Advancing ── save_every reached ──▶ Checkpointing
//!             │                                     │
//!             └──── range exhausted ──▶ Done ◀──────┘
//! ```
//!
//! Checkpoints are never read back; a crashed run has to be restarted from
//! scratch, with the checkpoint file as a manual fallback.

use crate::api::{FetchOutcome, SearchApi};
use crate::config::RunOptions;
use crate::error::{HarvestError, Result};
use crate::models::{QueryParameters, ResultTable, SearchWindow};
use crate::outputs::{final_output_path, write_table};
use crate::query::build_url;
use crate::windows::DateWindows;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Counters describing a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Windows requested.
    pub windows: usize,
    /// Rows in the final table.
    pub rows: usize,
    /// Windows whose response was unusable and contributed nothing.
    pub degraded_windows: usize,
    pub checkpoints_written: usize,
    /// Where the final table went, if it was saved.
    pub final_path: Option<PathBuf>,
}

enum RunState {
    Advancing(SearchWindow),
    Checkpointing(Option<SearchWindow>),
    Done,
}

impl RunState {
    fn after(window: Option<SearchWindow>) -> Self {
        window.map_or(RunState::Done, RunState::Advancing)
    }
}

/// Drives a [`SearchApi`] across a date range.
#[derive(Debug)]
pub struct Harvester<A> {
    api: A,
    endpoint: String,
    options: RunOptions,
}

impl<A: SearchApi> Harvester<A> {
    pub fn new(api: A, endpoint: impl Into<String>, options: RunOptions) -> Self {
        Self {
            api,
            endpoint: endpoint.into(),
            options,
        }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Fetch every window of `[params.date_from, params.date_to]`.
    ///
    /// Fails before any request when the range is reversed or the step/save
    /// interval is zero. A window whose response is unusable contributes no
    /// rows and the run moves on. Transport and file-system errors abort the
    /// run; whatever was last checkpointed stays on disk.
    #[instrument(level = "info", skip_all, fields(from = %params.date_from, to = %params.date_to))]
    pub async fn run(&self, params: &QueryParameters) -> Result<(ResultTable, RunSummary)> {
        let mut windows =
            DateWindows::new(params.date_from, params.date_to, self.options.time_step)?;
        if self.options.save_every == 0 {
            return Err(HarvestError::InvalidConfig(
                "save_every must be at least one window".to_string(),
            ));
        }

        let t0 = Instant::now();
        let mut table = ResultTable::new();
        let mut summary = RunSummary::default();
        let mut since_checkpoint = 0u64;
        let mut state = RunState::after(windows.next());

        loop {
            state = match state {
                RunState::Advancing(window) => {
                    let outcome = self.fetch_window(params, &window).await?;
                    if outcome.is_degraded() {
                        summary.degraded_windows += 1;
                    }
                    table.append_window(outcome.into_rows());
                    summary.windows += 1;
                    since_checkpoint += 1;

                    let next = windows.next();
                    if since_checkpoint == self.options.save_every {
                        RunState::Checkpointing(next)
                    } else {
                        RunState::after(next)
                    }
                }
                RunState::Checkpointing(next) => {
                    let checkpoint = self.options.checkpoint_file();
                    write_table(&table, &checkpoint, self.options.format).await?;
                    since_checkpoint = 0;
                    summary.checkpoints_written += 1;
                    info!(
                        path = %checkpoint.display(),
                        rows = table.len(),
                        "Checkpoint saved"
                    );
                    RunState::after(next)
                }
                RunState::Done => break,
            };
        }

        if self.options.save_final {
            let path = final_output_path(
                &self.options.output_dir,
                &self.options.output_prefix,
                params.date_from,
                params.date_to,
                self.options.format,
            );
            write_table(&table, &path, self.options.format).await?;
            summary.final_path = Some(path);
        }
        summary.rows = table.len();

        info!(
            windows = summary.windows,
            rows = summary.rows,
            degraded = summary.degraded_windows,
            checkpoints = summary.checkpoints_written,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Finish"
        );
        Ok((table, summary))
    }

    async fn fetch_window(
        &self,
        params: &QueryParameters,
        window: &SearchWindow,
    ) -> Result<FetchOutcome> {
        info!(from = %window.from, to = %window.to, days = window.days(), "Parsing articles");
        let url = build_url(&self.endpoint, &params.for_window(window));
        debug!(%url, "Built search URL");

        let outcome = self.api.search(&url).await?;
        match &outcome {
            FetchOutcome::Matches(rows) => {
                debug!(from = %window.from, rows = rows.len(), "Window fetched");
            }
            FetchOutcome::BadStatus(status) => {
                warn!(from = %window.from, status, "Search returned non-200 status; no rows for window");
            }
            FetchOutcome::NotJson(content_type) => {
                warn!(
                    from = %window.from,
                    content_type = content_type.as_deref().unwrap_or("<none>"),
                    "Search response is not JSON; no rows for window"
                );
            }
            FetchOutcome::Malformed(reason) => {
                warn!(from = %window.from, %reason, "Search response is malformed; no rows for window");
            }
        }
        Ok(outcome)
    }
}
