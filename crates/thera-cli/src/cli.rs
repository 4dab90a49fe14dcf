//! CLI argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Thera worker - process one chunk of pending extraction work.
///
/// Positional arguments select `<batch_size>` items starting at
/// `<start_index>` of the sorted pending set.
#[derive(Debug, Parser)]
#[command(name = "thera-worker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// First pending-set index of the chunk
    #[arg(required_unless_present_any = ["plan", "status"])]
    pub start_index: Option<usize>,

    /// Number of items in the chunk
    #[arg(required_unless_present_any = ["plan", "status"])]
    pub batch_size: Option<usize>,

    /// Print the chunk plan for N workers and exit
    #[arg(long, value_name = "N", conflicts_with = "status")]
    pub plan: Option<usize>,

    /// Print completed/pending counts and exit
    #[arg(long)]
    pub status: bool,

    /// Output format for --plan and --status
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.thera/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Inference endpoint base URL
    #[arg(long, env = "THERA_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Model served by the endpoint
    #[arg(long, env = "THERA_MODEL")]
    pub model: Option<String>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// What this invocation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Print a plan for this many workers
    Plan(usize),
    /// Print progress counts
    Status,
    /// Process one chunk
    Run {
        /// First pending-set index
        start_index: usize,
        /// Number of items
        batch_size: usize,
    },
}

impl Cli {
    /// Resolve the invocation mode; `--plan` and `--status` win over positionals.
    pub fn mode(&self) -> Mode {
        if let Some(workers) = self.plan {
            return Mode::Plan(workers);
        }
        if self.status {
            return Mode::Status;
        }
        Mode::Run {
            start_index: self.start_index.unwrap_or(0),
            batch_size: self.batch_size.unwrap_or(0),
        }
    }
}

impl From<CliFormat> for crate::output::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::output::OutputFormat::Table,
            CliFormat::Json => crate::output::OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_chunk() {
        let cli = Cli::parse_from(["thera-worker", "100", "25"]);
        assert_eq!(
            cli.mode(),
            Mode::Run {
                start_index: 100,
                batch_size: 25
            }
        );
        assert_eq!(cli.format, CliFormat::Table);
    }

    #[test]
    fn test_positionals_required_without_flags() {
        assert!(Cli::try_parse_from(["thera-worker"]).is_err());
        assert!(Cli::try_parse_from(["thera-worker", "10"]).is_err());
    }

    #[test]
    fn test_plan_mode() {
        let cli = Cli::parse_from(["thera-worker", "--plan", "4", "--format", "json"]);
        assert_eq!(cli.mode(), Mode::Plan(4));
        assert_eq!(cli.format, CliFormat::Json);
    }

    #[test]
    fn test_status_mode() {
        let cli = Cli::parse_from(["thera-worker", "--status"]);
        assert_eq!(cli.mode(), Mode::Status);
    }

    #[test]
    fn test_plan_conflicts_with_status() {
        assert!(Cli::try_parse_from(["thera-worker", "--plan", "2", "--status"]).is_err());
    }

    #[test]
    fn test_endpoint_flags() {
        let cli = Cli::parse_from([
            "thera-worker",
            "0",
            "10",
            "--endpoint",
            "http://gpu-node:11435",
            "--model",
            "llama3.1:8b",
        ]);
        assert_eq!(cli.endpoint.as_deref(), Some("http://gpu-node:11435"));
        assert_eq!(cli.model.as_deref(), Some("llama3.1:8b"));
    }
}
