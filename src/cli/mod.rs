//! CLI module
//!
//! # Submodules
//!
//! - `args` - Command-line argument definitions using clap
//! - `commands` - Command handler implementations
//! - `progress` - Progress bars, console helpers and the logging writer

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{Args, Commands, TestCommands};
pub use commands::run_command;
pub use progress::DualWriter;
