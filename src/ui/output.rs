//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! Diagnostics go to stderr; results go to stdout.

use std::fmt::Display;

use crate::core::types::{CommitPlan, ExecutedCommit, PlannedCommit};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    #[default]
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render one planned commit as a header line plus indented files.
pub fn format_planned(index: usize, commit: &PlannedCommit) -> String {
    let mut out = format!("{}. {}", index + 1, commit.full_message());
    if !commit.files.is_empty() {
        out.push('\n');
        out.push_str(&format_list(&commit.files, "     "));
    }
    out
}

/// Render a whole plan for review.
pub fn format_plan(plan: &CommitPlan) -> String {
    plan.commits
        .iter()
        .enumerate()
        .map(|(i, c)| format_planned(i, c))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per executed commit: `<id> <message>`.
pub fn format_executed(executed: &[ExecutedCommit]) -> String {
    executed
        .iter()
        .map(|c| format!("{} {}", c.id, c.message))
        .collect::<Vec<_>>()
        .join("\n")
}
