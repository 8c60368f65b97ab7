//! Command-line interface for rapidvoice
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Voice-driven disaster relief intake
#[derive(Parser, Debug)]
#[command(name = "rapidvoice", version, about = "Voice-driven disaster relief intake")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: progress, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Extraction model override (default: gemini-2.0-flash)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Recognition language tag (default: en-US)
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Capture device override
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an interactive intake session
    Intake,

    /// Extract fields from a single transcript and print the record
    Extract {
        /// Transcript text (reads stdin when omitted)
        text: Option<String>,

        /// Read the transcript from a file instead
        #[arg(long, value_name = "FILE", conflicts_with = "text")]
        file: Option<PathBuf>,
    },

    /// List the intake record's fields
    Fields {
        /// Include optional fields, not just the required seven
        #[arg(long)]
        all: bool,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration viewing actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// List resolved configuration values
    List,
    /// Print the default configuration file path
    Path,
    /// Dump a commented configuration template
    Dump,
}
