//! engine
//!
//! Execution context and the plan executor.
//!
//! # Architecture
//!
//! Commands build a [`Context`] from global flags, then hand a validated
//! plan to [`exec::Executor`]. The executor is the only component that turns
//! a plan into commits; the planner and the wizard never mutate the
//! repository themselves.
//!
//! # Invariants
//!
//! - Executor calls against the repository are strictly sequential
//! - Every long operation observes the context's cancellation token

pub mod exec;

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use crate::ui::output::Verbosity;

pub use exec::{ExecutionError, ExecutionFailure, Executor};

/// Execution context passed to every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
    /// Cancelled on Ctrl-C.
    pub cancel: CancellationToken,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            interactive: true,
            cancel: CancellationToken::new(),
        }
    }
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Directory commands run in.
    pub fn work_dir(&self) -> std::io::Result<PathBuf> {
        match &self.cwd {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir(),
        }
    }
}
