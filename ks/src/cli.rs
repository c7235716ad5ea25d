//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kickstart - interactive terminal tutorials
#[derive(Debug, Parser)]
#[command(
    name = "ks",
    about = "Step-by-step terminal tutorials with saved progress",
    version = env!("GIT_DESCRIBE")
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,

    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// UI language
    #[arg(short, long, global = true, help = "UI language (en, ko)")]
    pub lang: Option<String>,

    /// Progress document location
    #[arg(long, global = true, help = "Path to the progress file")]
    pub state_file: Option<PathBuf>,

    /// Directory the tutorials work in
    #[arg(short, long, global = true, help = "Directory the tutorials work in")]
    pub workspace: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Browse the tutorial menu (default)
    Menu,

    /// List tutorials grouped as in the menu
    List,

    /// Show completion per group and overall
    Status {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run one tutorial directly, skipping the menu
    Run {
        /// Tutorial name, e.g. MakeProject
        #[arg(value_name = "TUTORIAL")]
        name: String,
    },

    /// Clear all progress (the old file is backed up first)
    Reset {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Output format for status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl Cli {
    /// Log level implied by the flags; `--log-level` wins over `-v`
    pub fn effective_log_level(&self) -> Option<String> {
        if let Some(level) = &self.log_level {
            return Some(level.clone());
        }
        match self.verbose {
            0 => None,
            1 => Some("debug".to_string()),
            _ => Some("trace".to_string()),
        }
    }
}

/// Help footer naming where this run's log goes
pub fn generate_after_help() -> String {
    format!("Logs are written to: {}", get_log_path().display())
}

/// Log file written by `setup_logging`
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kickstart")
        .join("logs")
        .join("kickstart.log")
}
