//! Command-line interface definition using clap.

use std::path::PathBuf;
use std::time::Duration;

use eventline_queue::TieBreak;
use eventline_runtime::{Result, RuntimeConfig, RuntimeError};

/// Eventline - prioritized in-process event pipeline demo
#[derive(clap::Parser, Debug)]
#[command(name = "eventline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// JSON runtime configuration file
    #[arg(short, long, env = "EVENTLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Event types to drop (repeatable or comma-separated)
    #[arg(long = "drop-type", env = "EVENTLINE_DROP_TYPES", value_delimiter = ',')]
    pub drop_types: Vec<String>,

    /// Priorities to drop (repeatable or comma-separated)
    #[arg(long = "drop-priority", env = "EVENTLINE_DROP_PRIORITIES", value_delimiter = ',')]
    pub drop_priorities: Vec<String>,

    /// Sources to drop (repeatable or comma-separated)
    #[arg(long = "drop-source", env = "EVENTLINE_DROP_SOURCES", value_delimiter = ',')]
    pub drop_sources: Vec<String>,

    /// Ordering among events of equal priority (fifo, fields)
    #[arg(long, env = "EVENTLINE_TIE_BREAK")]
    pub tie_break: Option<TieBreak>,

    /// Stop after producing this many events
    #[arg(short = 'n', long)]
    pub count: Option<u64>,

    /// Minimum delay between produced events, in milliseconds
    #[arg(long, default_value = "500")]
    pub min_delay_ms: u64,

    /// Maximum delay between produced events, in milliseconds
    #[arg(long, default_value = "1500")]
    pub max_delay_ms: u64,
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// Resolves the runtime configuration.
    ///
    /// Starts from the config file when given. Drop flags replace the
    /// corresponding set. With neither a file nor any drop flag, the demo
    /// drop sets apply (unknown type, zero priority, unknown source).
    pub fn runtime_config(&self) -> Result<RuntimeConfig> {
        let mut config = match &self.config {
            Some(path) => RuntimeConfig::from_json_file(path)?,
            None if self.has_drop_flags() => RuntimeConfig::default(),
            None => RuntimeConfig::new()
                .with_drop_type("Unknown")
                .with_drop_priority("Zero")
                .with_drop_source("Unknown"),
        };

        if !self.drop_types.is_empty() {
            config.drop_types = self.drop_types.clone();
        }
        if !self.drop_priorities.is_empty() {
            config.drop_priorities = self.drop_priorities.clone();
        }
        if !self.drop_sources.is_empty() {
            config.drop_sources = self.drop_sources.clone();
        }
        if let Some(tie_break) = self.tie_break {
            config.tie_break = tie_break;
        }

        Ok(config)
    }

    /// Returns the producer delay range.
    pub fn pacing(&self) -> Result<(Duration, Duration)> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(RuntimeError::Config(format!(
                "min delay {}ms exceeds max delay {}ms",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        Ok((
            Duration::from_millis(self.min_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        ))
    }

    fn has_drop_flags(&self) -> bool {
        !(self.drop_types.is_empty()
            && self.drop_priorities.is_empty()
            && self.drop_sources.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};
    use std::io::Write;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["eventline"]);
        assert!(cli.count.is_none());
        assert_eq!(cli.min_delay_ms, 500);
        assert_eq!(cli.max_delay_ms, 1500);
    }

    #[test]
    fn test_default_drop_sets() {
        let cli = Cli::parse_from(["eventline"]);
        let config = cli.runtime_config().unwrap();

        assert_eq!(config.drop_types, vec!["Unknown".to_string()]);
        assert_eq!(config.drop_priorities, vec!["Zero".to_string()]);
        assert_eq!(config.drop_sources, vec!["Unknown".to_string()]);
    }

    #[test]
    fn test_drop_flags_replace_defaults() {
        let cli = Cli::parse_from([
            "eventline",
            "--drop-priority",
            "low,zero",
            "--drop-type",
            "New",
        ]);
        let config = cli.runtime_config().unwrap();

        assert_eq!(config.drop_types, vec!["New".to_string()]);
        assert_eq!(
            config.drop_priorities,
            vec!["low".to_string(), "zero".to_string()]
        );
        assert!(config.drop_sources.is_empty());
    }

    #[test]
    fn test_tie_break_flag() {
        let cli = Cli::parse_from(["eventline", "--tie-break", "fields"]);
        assert_eq!(cli.tie_break, Some(TieBreak::Fields));
        assert_eq!(cli.runtime_config().unwrap().tie_break, TieBreak::Fields);

        assert!(Cli::try_parse_from(["eventline", "--tie-break", "random"]).is_err());
    }

    #[test]
    fn test_config_file_with_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"drop_types": ["Logout"], "drop_sources": ["Web"]}}"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::parse_from(["eventline", "--config", &path, "--drop-source", "Mobile"]);
        let config = cli.runtime_config().unwrap();

        assert_eq!(config.drop_types, vec!["Logout".to_string()]);
        assert_eq!(config.drop_sources, vec!["Mobile".to_string()]);
        assert!(config.drop_priorities.is_empty());
    }

    #[test]
    fn test_pacing_validation() {
        let cli = Cli::parse_from(["eventline", "--min-delay-ms", "10", "--max-delay-ms", "20"]);
        let (min, max) = cli.pacing().unwrap();
        assert_eq!(min, Duration::from_millis(10));
        assert_eq!(max, Duration::from_millis(20));

        let cli = Cli::parse_from(["eventline", "--min-delay-ms", "30", "--max-delay-ms", "20"]);
        assert!(matches!(cli.pacing(), Err(RuntimeError::Config(_))));
    }

    #[test]
    fn test_cli_verbose() {
        let cli = Cli::parse_from(["eventline", "-vvv"]);
        assert_eq!(cli.verbose, 3);
        assert_eq!(cli.log_level(), tracing::Level::TRACE);
    }

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }
}
