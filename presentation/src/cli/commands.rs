//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for critique results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Score, every finding and the revision trail
    Full,
    /// Score, final answer and counts per category
    Summary,
    /// The whole outcome as JSON
    Json,
}

impl From<OutputFormat> for critique_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => Self::Full,
            OutputFormat::Summary => Self::Summary,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// CLI arguments for answer-critique
#[derive(Parser, Debug)]
#[command(name = "answer-critique")]
#[command(author, version, about = "Critique and revise cited theological answers")]
#[command(long_about = r#"
answer-critique scores a generated answer for reasoning fallacies, weakly
supported citations and one-sided rhetoric, then asks a generation backend
for a bounded number of revisions while the score stays below the threshold.

The input is a JSON file:
  { "question": "...", "answer": { "summary": "... [1]", "citations": [...] },
    "reasoning": "..." }

Configuration files are loaded from (in priority order):
1. CRITIQUE_* environment variables
2. --config <path>     Explicit config file
3. ./critique.toml     Project-level config
4. ~/.config/answer-critique/config.toml   Global config

Example:
  answer-critique answer.json
  answer-critique --no-revise --output full answer.json
  cat answer.json | answer-critique -
"#)]
pub struct Cli {
    /// Input JSON file ("-" reads standard input)
    pub input: Option<PathBuf>,

    /// Question to use instead of the one in the input file
    #[arg(long, value_name = "TEXT")]
    pub question: Option<String>,

    /// Critique only; never call the generation backend
    #[arg(long)]
    pub no_revise: bool,

    /// Quality threshold (0-100) overriding the configured one
    #[arg(long, value_name = "SCORE", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: Option<u8>,

    /// Maximum revision attempts overriding the configured limit
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<usize>,

    /// Output format [default: summary, or the configured one]
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Append critique events as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub events: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress status messages on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
