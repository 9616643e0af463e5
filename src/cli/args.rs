//! Command-line argument definitions
//!
//! This module defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Compare contactless card identities across tag dumps and live scans
#[derive(Parser, Debug)]
#[command(name = "nfc-compare")]
#[command(version)]
#[command(about = "Compare NFC card profiles from dump files and reader scans", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace (overrides config)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Capture file replayed as the card in the field (overrides config)
    #[arg(long, global = true, value_name = "FILE")]
    pub capture: Option<PathBuf>,

    /// Scan timeout in milliseconds (overrides config)
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum bytes read from a dump, 0 for the whole file (overrides config)
    #[arg(long, global = true, value_name = "BYTES")]
    pub max_read_bytes: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the profile of a dump file and print it
    Inspect {
        file: PathBuf,

        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the 16-byte digest of a file's contents
    Digest { file: PathBuf },

    /// Compare two dump files (exit status 1 when they differ)
    Compare {
        a: PathBuf,
        b: PathBuf,

        /// Print the first failing check when the profiles differ
        #[arg(short, long)]
        explain: bool,
    },

    /// Read the card in the field and print its profile
    Scan {
        /// Print the profile as JSON
        #[arg(long)]
        json: bool,

        /// Save the raw read as a capture file for later replay
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },

    /// Compare a dump file with the card in the field (exit status 1 when they differ)
    Verify {
        file: PathBuf,

        /// Print the first failing check when the profiles differ
        #[arg(short, long)]
        explain: bool,
    },

    /// Find the dumps in a directory that match a file or the card in the field
    Find {
        /// Dump to look for; reads the card in the field when omitted
        file: Option<PathBuf>,

        /// Directory of dumps to search
        #[arg(long = "in", value_name = "DIR")]
        dir: PathBuf,

        /// Only search the top-level directory
        #[arg(long)]
        no_recursive: bool,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive session with slots for dump A, dump B and the scanned card
    Interactive,

    /// Create or locate the configuration file
    ///
    /// The config file is stored at:
    /// - Windows: %APPDATA%\nfc_compare\config.toml
    /// - Linux/macOS: ~/.config/nfc_compare/config.toml
    Config {
        /// Show the config file path only
        #[arg(long)]
        path: bool,

        /// Reset config to defaults (creates a fresh config file)
        #[arg(long)]
        reset: bool,
    },

    /// Generate a configuration file at a specific location
    GenerateConfig {
        /// Output path for the config file (defaults to standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show current configuration
    ShowConfig,

    /// Run built-in scenarios against a mock reader (no hardware required)
    Test {
        #[command(subcommand)]
        test_command: TestCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum TestCommands {
    /// Run all available test scenarios
    RunAll {
        /// Directory for a JSON report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop on first failure
        #[arg(long)]
        fail_fast: bool,
    },

    /// Run tests filtered by tag
    RunTag {
        /// Tag to filter scenarios by (see `list-tags`)
        tag: String,
    },

    /// Run specific test scenarios by name
    Run {
        /// Scenario names to run (comma-separated or multiple values)
        #[arg(value_delimiter = ',', required = true)]
        scenarios: Vec<String>,
    },

    /// List all available test scenarios
    List {
        /// Filter by tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// List all available tags for filtering
    ListTags,
}
