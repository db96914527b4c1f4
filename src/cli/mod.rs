//! cli
//!
//! Command-line interface layer for commitweave.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Render progress, repairs, and errors for humans
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, builds an
//! [`engine::Context`], and dispatches to a handler. Handlers call into
//! [`crate::planner`], [`crate::engine::exec`], and [`crate::rebase`]; they
//! never run git themselves.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::engine;
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(),
        ..Default::default()
    };

    commands::dispatch(cli.command, &ctx)
}
