//! Command-line and environment configuration.
//!
//! Every option can also come from a `WIKIQUIZ_*` environment variable; a
//! `.env` file in the working directory is loaded before parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::notify::NotifyPolicy;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Environment variable holding the `tracing` filter directive.
pub const LOG_ENV: &str = "WIKIQUIZ_LOG";

const DEFAULT_LOG_FILE: &str = "wikiquiz.log";

#[derive(Parser, Debug)]
#[command(version, about = "Generate and play quizzes from articles", long_about = None)]
pub struct Args {
    /// Base URL of the quiz service
    #[arg(long, env = "WIKIQUIZ_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "WIKIQUIZ_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    /// Which notices the interactive client shows
    #[arg(long, env = "WIKIQUIZ_NOTIFY", value_enum, default_value_t = NotifyPolicy::Errors)]
    pub notify: NotifyPolicy,

    /// Log file for the interactive client
    #[arg(long, env = "WIKIQUIZ_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play interactively (default)
    Play,
    /// Generate a quiz for an article URL and print it
    Generate {
        url: String,
        /// Print the quiz as JSON
        #[arg(long)]
        json: bool,
    },
    /// List previously generated quizzes
    History,
    /// Print a previously generated quiz
    Show {
        id: String,
        /// Print the quiz as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Args {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Command::Play))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_FILE))
    }
}
