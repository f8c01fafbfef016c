//! Error type shared by every stage of a harvest run.
//!
//! Only a handful of conditions are fatal: a bad date range or configuration
//! (rejected before any request is sent), transport faults from the HTTP
//! client, and failures while persisting the table. A search response that is
//! merely unusable is *not* an error; see [`crate::api::FetchOutcome`].

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvestError {
    /// The overall range starts after it ends.
    #[error("dateFrom ({from}) should be less than or equal to dateTo ({to})")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("{field} must be a YYYY-MM-DD date, got {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, HarvestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range_message_names_both_dates() {
        let err = HarvestError::InvalidRange {
            from: NaiveDate::from_ymd_opt(2019, 2, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2019-02-01"));
        assert!(msg.contains("2019-01-01"));
    }

    #[test]
    fn test_invalid_date_message() {
        let err = HarvestError::InvalidDate {
            field: "dateTo",
            value: "01/02/2019".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "dateTo must be a YYYY-MM-DD date, got \"01/02/2019\""
        );
    }
}
