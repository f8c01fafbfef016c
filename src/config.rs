//! Run configuration.
//!
//! A run is described by an [`AppConfig`]: the search parameters sent with
//! every request ([`SearchConfig`]) and the options controlling windowing and
//! persistence ([`RunOptions`]). Configuration can come from a YAML file and
//! is then overridden field by field from the command line.
//!
//! ```yaml
//! search:
//!   query: ""
//!   size: 1000000
//!   sort: date
//!   bloc: 4
//!   date_from: "2019-01-01"
//!   date_to: "2019-02-01"
//! run:
//!   time_step: 1
//!   save_every: 5
//!   format: csv
//! ```

use crate::error::{HarvestError, Result};
use crate::models::{QueryParameters, SortMode};
use crate::outputs::OutputFormat;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://lenta.ru/search/v2/process";

/// Search parameters shared by every window of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub query: String,
    pub offset: u64,
    pub size: u64,
    pub sort: SortMode,
    pub title_only: bool,
    pub domain: u32,
    /// `0` means all material types.
    pub material_type: u32,
    /// `0` means all categories.
    pub bloc: u32,
    /// First day of the overall range, `YYYY-MM-DD`.
    pub date_from: Option<String>,
    /// Last day of the overall range (inclusive), `YYYY-MM-DD`.
    pub date_to: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            query: String::new(),
            offset: 0,
            size: 1_000_000,
            sort: SortMode::Date,
            title_only: false,
            domain: 1,
            material_type: 0,
            bloc: 0,
            date_from: None,
            date_to: None,
        }
    }
}

fn parse_date(field: &'static str, value: Option<&str>) -> Result<NaiveDate> {
    let value = value.ok_or_else(|| HarvestError::InvalidConfig(format!("{field} is required")))?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| HarvestError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

impl SearchConfig {
    /// Resolve into typed parameters covering the whole requested range.
    ///
    /// Zero filters become `None`. Range ordering is not checked here; that
    /// happens when the run starts.
    pub fn to_parameters(&self) -> Result<QueryParameters> {
        Ok(QueryParameters {
            query: self.query.clone(),
            offset: self.offset,
            size: self.size,
            sort: self.sort,
            title_only: self.title_only,
            domain: self.domain,
            material_type: QueryParameters::filter(self.material_type),
            bloc: QueryParameters::filter(self.bloc),
            date_from: parse_date("dateFrom", self.date_from.as_deref())?,
            date_to: parse_date("dateTo", self.date_to.as_deref())?,
        })
    }
}

/// Windowing and persistence options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Width of each window in days.
    pub time_step: u64,
    /// Write a checkpoint after this many windows.
    pub save_every: u64,
    /// Write the final table once the whole range is covered.
    pub save_final: bool,
    /// Overwritten at every checkpoint. When unset, see [`RunOptions::checkpoint_file`].
    pub checkpoint_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// File name prefix of the final table.
    pub output_prefix: String,
    pub format: OutputFormat,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            time_step: 1,
            save_every: 5,
            save_final: true,
            checkpoint_path: None,
            output_dir: PathBuf::from("."),
            output_prefix: "lenta".to_string(),
            format: OutputFormat::Csv,
        }
    }
}

impl RunOptions {
    /// Where checkpoints go: the configured path, or
    /// `<tmp>/checkpoint_table.<ext>` matching the final `format`.
    pub fn checkpoint_file(&self) -> PathBuf {
        self.checkpoint_path
            .clone()
            .unwrap_or_else(|| default_checkpoint_path(self.format))
    }
}

/// `<tmp>/checkpoint_table.<ext>`
pub fn default_checkpoint_path(format: OutputFormat) -> PathBuf {
    std::env::temp_dir().join(format!("checkpoint_table.{}", format.extension()))
}

/// Complete configuration for one harvest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub run: RunOptions,
}

impl AppConfig {
    /// Load from a YAML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&text)?;
        info!(config_path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Reject option values the run loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.run.time_step == 0 {
            return Err(HarvestError::InvalidConfig(
                "time_step must be at least one day".to_string(),
            ));
        }
        if self.run.save_every == 0 {
            return Err(HarvestError::InvalidConfig(
                "save_every must be at least one window".to_string(),
            ));
        }
        Url::parse(&self.search.endpoint).map_err(|e| {
            HarvestError::InvalidConfig(format!("endpoint {:?}: {e}", self.search.endpoint))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.search.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.search.size, 1_000_000);
        assert_eq!(config.search.domain, 1);
        assert_eq!(config.run.time_step, 1);
        assert_eq!(config.run.save_every, 5);
        assert!(config.run.save_final);
        assert_eq!(config.run.checkpoint_path, None);
        assert!(config.run.checkpoint_file().ends_with("checkpoint_table.csv"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
search:
  query: "нефть"
  bloc: 4
  date_from: "2019-01-01"
  date_to: "2019-02-01"
run:
  save_every: 10
  format: json
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.search.query, "нефть");
        assert_eq!(config.search.bloc, 4);
        assert_eq!(config.search.sort, SortMode::Date);
        assert_eq!(config.run.save_every, 10);
        assert_eq!(config.run.time_step, 1);
        assert_eq!(config.run.format, OutputFormat::Json);
        assert!(config.run.checkpoint_file().ends_with("checkpoint_table.json"));
    }

    #[test]
    fn test_explicit_checkpoint_path_wins_over_format() {
        let yaml = "run:\n  format: json\n  checkpoint_path: /data/ckpt.out\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.run.checkpoint_file(), PathBuf::from("/data/ckpt.out"));
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "search:\n  sort: relevance\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.search.sort, SortMode::Relevance);
    }

    #[test]
    fn test_to_parameters() {
        let search = SearchConfig {
            material_type: 1,
            bloc: 0,
            date_from: Some("2019-01-01".to_string()),
            date_to: Some("2019-02-01".to_string()),
            ..SearchConfig::default()
        };
        let params = search.to_parameters().unwrap();
        assert_eq!(params.material_type, NonZeroU32::new(1));
        assert_eq!(params.bloc, None);
        assert_eq!(params.date_to, NaiveDate::from_ymd_opt(2019, 2, 1).unwrap());
    }

    #[test]
    fn test_to_parameters_rejects_bad_dates() {
        let search = SearchConfig {
            date_from: Some("2019/01/01".to_string()),
            date_to: Some("2019-02-01".to_string()),
            ..SearchConfig::default()
        };
        assert!(matches!(
            search.to_parameters(),
            Err(HarvestError::InvalidDate { field: "dateFrom", .. })
        ));

        let missing = SearchConfig::default();
        assert!(matches!(
            missing.to_parameters(),
            Err(HarvestError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.run.save_every = 0;
        assert!(config.validate().is_err());

        config.run.save_every = 5;
        config.search.endpoint = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
