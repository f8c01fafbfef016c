//! Splitting an overall date range into consecutive search windows.

use crate::error::{HarvestError, Result};
use crate::models::SearchWindow;
use chrono::{Days, NaiveDate};

/// Iterator over contiguous, non-overlapping windows covering `[from, to]`.
///
/// Every window spans `step` days except possibly the last, which is clipped
/// to the end of the range.
#[derive(Debug, Clone)]
pub struct DateWindows {
    next_from: Option<NaiveDate>,
    end: NaiveDate,
    step: u64,
}

impl DateWindows {
    /// Fails with [`HarvestError::InvalidRange`] when `from > to`, and with
    /// [`HarvestError::InvalidConfig`] when `step` is zero.
    pub fn new(from: NaiveDate, to: NaiveDate, step: u64) -> Result<Self> {
        if from > to {
            return Err(HarvestError::InvalidRange { from, to });
        }
        if step == 0 {
            return Err(HarvestError::InvalidConfig(
                "time_step must be at least one day".to_string(),
            ));
        }
        Ok(Self {
            next_from: Some(from),
            end: to,
            step,
        })
    }
}

impl Iterator for DateWindows {
    type Item = SearchWindow;

    fn next(&mut self) -> Option<SearchWindow> {
        let from = self.next_from?;
        let to = from
            .checked_add_days(Days::new(self.step - 1))
            .map_or(self.end, |to| to.min(self.end));

        self.next_from = to.succ_opt().filter(|next| *next <= self.end);
        Some(SearchWindow { from, to })
    }
}
