//! CLI argument parsing definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "jobload", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run virtual users against the target until the duration elapses or Ctrl-C
    Run(RunArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },

    /// Summarize a persisted job_events.json log
    Summarize {
        /// Path to the JSON event log
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Overrides applied on top of the loaded configuration
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Base URL of the target system
    #[arg(long, value_name = "URL")]
    pub target: Option<String>,

    /// Number of virtual users
    #[arg(long, value_name = "N")]
    pub users: Option<usize>,

    /// Users started per second
    #[arg(long, value_name = "RATE")]
    pub spawn_rate: Option<f64>,

    /// Run duration in seconds
    #[arg(long, value_name = "SECS", value_parser = parse_secs)]
    pub duration: Option<Duration>,

    /// Maximum simultaneous job-creation calls
    #[arg(long, value_name = "N")]
    pub max_concurrent: Option<usize>,

    /// Create live jobs without a time window
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub live: bool,

    /// Window start, epoch seconds
    #[arg(long, value_name = "EPOCH", requires = "end")]
    pub start: Option<i64>,

    /// Window end, epoch seconds
    #[arg(long, value_name = "EPOCH", requires = "start")]
    pub end: Option<i64>,

    /// Directory for job_events.csv and job_events.json
    #[arg(long, value_name = "PATH")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Generate a sample configuration file with every default spelled out
    Generate {
        /// Output file path; prints to stdout when omitted
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_secs(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    Duration::try_from_secs_f64(seconds).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_overrides_parse() {
        let cli = Cli::try_parse_from([
            "jobload",
            "--log-level",
            "debug",
            "run",
            "--target",
            "http://sut:8000",
            "--users",
            "5",
            "--duration",
            "90.5",
            "--start",
            "100",
            "--end",
            "200",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.target.as_deref(), Some("http://sut:8000"));
        assert_eq!(args.users, Some(5));
        assert_eq!(args.duration, Some(Duration::from_millis(90_500)));
        assert_eq!((args.start, args.end), (Some(100), Some(200)));
        assert!(!args.live);
    }

    #[test]
    fn test_live_conflicts_with_window() {
        assert!(Cli::try_parse_from(["jobload", "run", "--live", "--start", "1", "--end", "2"]).is_err());
        assert!(Cli::try_parse_from(["jobload", "run", "--start", "1"]).is_err());
    }

    #[test]
    fn test_rejects_negative_duration() {
        assert!(Cli::try_parse_from(["jobload", "run", "--duration", "-3"]).is_err());
        assert!(Cli::try_parse_from(["jobload", "run", "--duration", "soon"]).is_err());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from([
            "jobload",
            "summarize",
            "results/job_events.json",
            "--config",
            "jobload.yaml",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("jobload.yaml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Summarize {
                format: OutputFormat::Json,
                ..
            })
        ));
    }
}
