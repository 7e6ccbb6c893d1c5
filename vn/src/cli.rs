//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use wordstore::Difficulty;

/// Vocabnotify - spaced vocabulary reminders
#[derive(Parser)]
#[command(
    name = "vn",
    about = "Spaced vocabulary reminders with quota- and window-aware scheduling",
    version,
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a word
    Add {
        /// The word itself
        word: String,

        /// Its meaning
        meaning: String,

        /// Example sentence
        #[arg(short, long)]
        example: Option<String>,

        /// Difficulty tag (easy, medium, hard)
        #[arg(short, long, default_value = "medium")]
        difficulty: Difficulty,

        /// Create the word without scheduling it for reminders
        #[arg(long)]
        inactive: bool,
    },

    /// List words
    List {
        /// Include inactive words
        #[arg(short, long)]
        all: bool,
    },

    /// Remove a word
    Remove {
        /// Word ID (or partial match)
        id: String,
    },

    /// Enable reminders for a word
    Activate {
        /// Word ID (or partial match)
        id: String,
    },

    /// Disable reminders for a word
    Deactivate {
        /// Word ID (or partial match)
        id: String,
    },

    /// Show or change notification settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Run the reminder scheduler in the foreground
    Run,
}

/// Settings management subcommands
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the current settings record
    Show,

    /// Change one or more preference fields
    Set {
        /// Turn notifications on
        #[arg(long, conflicts_with = "disabled")]
        enabled: bool,

        /// Turn notifications off
        #[arg(long)]
        disabled: bool,

        /// Daily notification quota (1-1000)
        #[arg(long)]
        daily_count: Option<u32>,

        /// First hour of the active window (0-23)
        #[arg(long)]
        start: Option<u32>,

        /// First hour after the active window (1-23)
        #[arg(long)]
        end: Option<u32>,
    },
}
