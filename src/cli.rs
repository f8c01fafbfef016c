//! Command-line interface definitions.
//!
//! Every search parameter and run option can be given on the command line.
//! When `--config` points at a YAML file, the file is loaded first and flags
//! given on the command line replace the corresponding values.

use crate::config::AppConfig;
use crate::models::SortMode;
use crate::outputs::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for lenta_harvest.
///
/// # Examples
///
/// ```sh
/// # January 2019, economics only, one request per day
/// lenta_harvest --date-from 2019-01-01 --date-to 2019-02-01 --bloc 4
///
/// # Weekly windows, checkpoint every 4 weeks, JSON output
/// lenta_harvest -c harvest.yaml --time-step 7 --save-every 4 --format json
/// ```
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "LENTA_HARVEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Search endpoint URL
    #[arg(long, env = "LENTA_SEARCH_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Free-text search query
    #[arg(short, long)]
    pub query: Option<String>,

    /// Pagination offset
    #[arg(long)]
    pub offset: Option<u64>,

    /// Page size
    #[arg(long)]
    pub size: Option<u64>,

    /// Result ordering
    #[arg(long, value_enum)]
    pub sort: Option<SortMode>,

    /// Match the query against titles only (`--title-only` alone means true)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub title_only: Option<bool>,

    #[arg(long)]
    pub domain: Option<u32>,

    /// Material type filter (0 = all)
    #[arg(long = "type")]
    pub material_type: Option<u32>,

    /// Category filter (0 = all)
    #[arg(long)]
    pub bloc: Option<u32>,

    /// First day of the range (YYYY-MM-DD)
    #[arg(short = 'f', long)]
    pub date_from: Option<String>,

    /// Last day of the range, inclusive (YYYY-MM-DD)
    #[arg(short = 't', long)]
    pub date_to: Option<String>,

    /// Window width in days
    #[arg(long)]
    pub time_step: Option<u64>,

    /// Write a checkpoint every N windows
    #[arg(long)]
    pub save_every: Option<u64>,

    /// Skip writing the final table
    #[arg(long)]
    pub no_final_save: bool,

    /// Checkpoint file (default: <tmp>/checkpoint_table.<ext>)
    #[arg(long)]
    pub checkpoint_path: Option<PathBuf>,

    /// Directory for the final table
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// File name prefix of the final table
    #[arg(long)]
    pub output_prefix: Option<String>,

    /// Table format for checkpoint and final file
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of leading rows to log once the run finishes
    #[arg(long, default_value_t = 5)]
    pub preview: usize,
}

impl Cli {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        let search = &mut config.search;
        if let Some(endpoint) = &self.endpoint {
            search.endpoint = endpoint.clone();
        }
        if let Some(query) = &self.query {
            search.query = query.clone();
        }
        if let Some(offset) = self.offset {
            search.offset = offset;
        }
        if let Some(size) = self.size {
            search.size = size;
        }
        if let Some(sort) = self.sort {
            search.sort = sort;
        }
        if let Some(title_only) = self.title_only {
            search.title_only = title_only;
        }
        if let Some(domain) = self.domain {
            search.domain = domain;
        }
        if let Some(material_type) = self.material_type {
            search.material_type = material_type;
        }
        if let Some(bloc) = self.bloc {
            search.bloc = bloc;
        }
        if let Some(date_from) = &self.date_from {
            search.date_from = Some(date_from.clone());
        }
        if let Some(date_to) = &self.date_to {
            search.date_to = Some(date_to.clone());
        }

        let run = &mut config.run;
        if let Some(time_step) = self.time_step {
            run.time_step = time_step;
        }
        if let Some(save_every) = self.save_every {
            run.save_every = save_every;
        }
        if self.no_final_save {
            run.save_final = false;
        }
        if let Some(format) = self.format {
            run.format = format;
        }
        if let Some(path) = &self.checkpoint_path {
            run.checkpoint_path = Some(path.clone());
        }
        if let Some(dir) = &self.output_dir {
            run.output_dir = dir.clone();
        }
        if let Some(prefix) = &self.output_prefix {
            run.output_prefix = prefix.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "lenta_harvest",
            "--date-from",
            "2019-01-01",
            "--date-to",
            "2019-02-01",
            "--type",
            "1",
            "--bloc",
            "4",
            "--sort",
            "relevance",
        ]);

        assert_eq!(cli.date_from.as_deref(), Some("2019-01-01"));
        assert_eq!(cli.date_to.as_deref(), Some("2019-02-01"));
        assert_eq!(cli.material_type, Some(1));
        assert_eq!(cli.bloc, Some(4));
        assert_eq!(cli.sort, Some(SortMode::Relevance));
        assert_eq!(cli.preview, 5);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "lenta_harvest",
            "-f",
            "2019-01-01",
            "-t",
            "2019-01-05",
            "-o",
            "/tmp/out",
            "-q",
            "нефть",
        ]);

        assert_eq!(cli.date_from.as_deref(), Some("2019-01-01"));
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(cli.query.as_deref(), Some("нефть"));
    }

    #[test]
    fn test_title_only_as_bare_flag() {
        let cli = Cli::try_parse_from(["lenta_harvest", "--title-only"]).unwrap();
        assert_eq!(cli.title_only, Some(true));

        let cli = Cli::try_parse_from(["lenta_harvest", "--title-only", "false"]).unwrap();
        assert_eq!(cli.title_only, Some(false));

        let cli = Cli::try_parse_from(["lenta_harvest"]).unwrap();
        assert_eq!(cli.title_only, None);
    }

    #[test]
    fn test_apply_overrides_only_given_flags() {
        let mut base = AppConfig::default();
        base.search.bloc = 4;
        base.search.query = "from file".to_string();
        base.run.save_every = 10;

        let cli = Cli {
            query: Some("from flag".to_string()),
            time_step: Some(3),
            no_final_save: true,
            ..Cli::default()
        };
        let config = cli.apply(base);

        assert_eq!(config.search.query, "from flag");
        assert_eq!(config.search.bloc, 4);
        assert_eq!(config.run.save_every, 10);
        assert_eq!(config.run.time_step, 3);
        assert!(!config.run.save_final);
    }

    #[test]
    fn test_apply_format_moves_default_checkpoint() {
        let cli = Cli {
            format: Some(OutputFormat::Json),
            ..Cli::default()
        };
        let config = cli.apply(AppConfig::default());
        assert_eq!(config.run.format, OutputFormat::Json);
        assert!(config.run.checkpoint_file().ends_with("checkpoint_table.json"));
    }

    #[test]
    fn test_yaml_format_sets_checkpoint_extension() {
        let base: AppConfig = serde_yaml::from_str("run:\n  format: json\n").unwrap();
        let config = Cli::default().apply(base);
        assert_eq!(config.run.format, OutputFormat::Json);
        assert!(config.run.checkpoint_file().ends_with("checkpoint_table.json"));
    }
}
