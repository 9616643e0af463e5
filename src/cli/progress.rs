//! Console output and progress utilities
//!
//! Print helpers shared by the command handlers, the catalog progress bar,
//! and the writer used for console plus file logging.

use crate::catalog::CatalogProgress;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

// ============================================================================
// Styles
// ============================================================================

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷")
}

fn progress_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("  {spinner:.green} [{bar:40.cyan/dim}] {pos}/{len} ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━╾─")
}

// ============================================================================
// Console output helpers
// ============================================================================

/// Print a header section with a box
pub fn print_header(title: &str) {
    let width = 68;
    let title_padded = format!("{:^width$}", title, width = width - 2);
    println!();
    println!("╔{}╗", "═".repeat(width - 2));
    println!("║{}║", title_padded);
    println!("╚{}╝", "═".repeat(width - 2));
    println!();
}

/// Print a section divider
pub fn print_divider() {
    println!();
    println!("{}", "─".repeat(60));
    println!();
}

/// Print a success message with checkmark
pub fn print_success(msg: &str) {
    println!("  ✓ {}", msg);
}

/// Print an info message with bullet
pub fn print_info(msg: &str) {
    println!("  • {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("  ⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    println!("  ✗ {}", msg);
}

/// Indent every line of a multi-line block
pub fn print_block(block: &str) {
    for line in block.lines() {
        println!("    {}", line);
    }
}

// ============================================================================
// Spinner while waiting for a card
// ============================================================================

/// Spinner shown while a reader is polled
pub struct WaitSpinner {
    spinner: ProgressBar,
}

impl WaitSpinner {
    pub fn new(msg: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner.set_message(msg.to_string());
        Self { spinner }
    }

    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

// ============================================================================
// Catalog progress
// ============================================================================

/// Progress bar for building a catalog
pub struct CatalogProgressBar {
    bar: ProgressBar,
}

impl CatalogProgressBar {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(progress_bar_style());
        bar.set_message("Reading dumps...");
        Self { bar }
    }

    /// Update from a catalog progress report
    ///
    /// Reports arrive from worker threads in any order; the bar only moves
    /// forward.
    pub fn update(&self, progress: &CatalogProgress) {
        if self.bar.length() != Some(progress.total as u64) {
            self.bar.set_length(progress.total as u64);
        }
        if (progress.current as u64) > self.bar.position() {
            self.bar.set_position(progress.current as u64);
        }
        if progress.errors > 0 {
            self.bar
                .set_message(format!("{} unreadable", progress.errors));
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for CatalogProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Format bytes in human-readable form
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

// ============================================================================
// Dual writer for file + console logging
// ============================================================================

/// A writer that writes to both console and file
///
/// Used for logging to both stderr and a log file simultaneously.
pub struct DualWriter {
    pub console: std::io::Stderr,
    pub file: std::fs::File,
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write_all(buf)?;
        self.console.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()?;
        self.console.flush()
    }
}
