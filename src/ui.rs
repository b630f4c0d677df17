//! Terminal status output.
//!
//! Stateless helpers over `colored`; fatal conditions get the red marker,
//! recoverable ones the yellow marker.

use colored::Colorize;

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Unmarked follow-up line for a preceding error report.
pub fn hint(msg: &str) {
    eprintln!("{}", msg);
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}
