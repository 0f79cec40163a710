//! Terminal output helpers.
//!
//! Results go to stdout as JSON; status lines go to stderr so output stays
//! pipeable.

use crate::error::CliResult;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::io::{self, Write};
use std::time::Duration;

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Print one compact JSON value per line.
pub fn print_lines<'a>(values: impl IntoIterator<Item = &'a Value>) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    for value in values {
        serde_json::to_writer(&mut stdout, value)?;
        writeln!(stdout)?;
    }
    Ok(())
}

/// Print a success line.
pub fn success(msg: &str) {
    eprintln!("  {} {}", "✓".green().bold(), msg.green());
}

/// Print a progress line.
pub fn info(msg: &str) {
    eprintln!("  {} {}", "→".cyan(), msg);
}

/// Create a spinner on stderr.
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .map(|s| s.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]))
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
