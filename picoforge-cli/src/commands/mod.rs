//! Command implementations.

use std::fmt::Display;

use colored::Colorize;

pub mod decode;
pub mod diff;
pub mod encode;

/// Print a section heading.
fn heading(title: &str) {
    println!();
    println!("{}", title.bold());
}

/// Print an aligned `label: value` row.
fn row(label: &str, value: impl Display) {
    println!("   {} {}", format!("{:<20}", format!("{label}:")).dimmed(), value);
}

fn on_off(enabled: bool) -> colored::ColoredString {
    if enabled {
        "enabled".green()
    } else {
        "disabled".normal()
    }
}
