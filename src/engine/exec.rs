//! engine::exec
//!
//! The plan executor.
//!
//! # Executor Contract
//!
//! For each planned commit, sequentially and in plan order:
//!
//! 1. Report progress (`i+1`, total, commit)
//! 2. In dry-run mode, synthesize an [`ExecutedCommit`] with id `(dry-run)`
//! 3. Otherwise unstage everything, stage the commit's files, and commit
//!    with the rendered subject line
//! 4. A commit whose files expand to nothing is skipped; any other failure
//!    stops execution
//!
//! # Invariants
//!
//! - Atomicity is per commit: earlier commits are kept when a later one fails
//! - On success the executed list is the plan minus skipped commits, in order
//! - A non-dry run where every commit was skipped is an error
//!
//! # Example
//!
//! ```ignore
//! use commitweave::engine::exec::Executor;
//!
//! let executor = Executor::new(&git, false);
//! match executor.execute(&plan) {
//!     Ok(executed) => println!("{} commit(s) created", executed.len()),
//!     Err(failure) => {
//!         eprintln!("{}", failure.error);
//!         eprintln!("{} commit(s) were created before the failure", failure.executed.len());
//!     }
//! }
//! ```

use thiserror::Error;

use crate::core::types::{CommitPlan, ExecutedCommit, PlannedCommit, DRY_RUN_ID};
use crate::git::{Git, GitError};

/// Errors from plan execution.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A commit failed to stage or commit.
    #[error("commit {} of {total} failed ({}): {cause}", .commit_index + 1, .planned.full_message())]
    Commit {
        /// 0-based index into the plan
        commit_index: usize,
        total: usize,
        planned: PlannedCommit,
        #[source]
        cause: GitError,
    },

    /// Every planned commit was skipped.
    #[error("no commits were executed")]
    NothingExecuted,
}

/// A failed execution with the commits that did succeed.
#[derive(Debug)]
pub struct ExecutionFailure {
    pub executed: Vec<ExecutedCommit>,
    pub error: ExecutionError,
}

impl std::fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ExecutionFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// The plan executor.
pub struct Executor<'a> {
    git: &'a Git,
    dry_run: bool,
}

impl<'a> Executor<'a> {
    pub fn new(git: &'a Git, dry_run: bool) -> Self {
        Self { git, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Execute without progress reporting.
    pub fn execute(&self, plan: &CommitPlan) -> Result<Vec<ExecutedCommit>, ExecutionFailure> {
        self.execute_with_progress(plan, |_, _, _| {})
    }

    /// Execute, calling `progress(i + 1, total, commit)` before each commit.
    pub fn execute_with_progress<F>(
        &self,
        plan: &CommitPlan,
        mut progress: F,
    ) -> Result<Vec<ExecutedCommit>, ExecutionFailure>
    where
        F: FnMut(usize, usize, &PlannedCommit),
    {
        let total = plan.len();
        let mut executed = Vec::with_capacity(total);

        for (index, planned) in plan.commits.iter().enumerate() {
            progress(index + 1, total, planned);
            let message = planned.full_message();

            if self.dry_run {
                executed.push(ExecutedCommit {
                    id: DRY_RUN_ID.to_string(),
                    message,
                    files: planned.files.clone(),
                });
                continue;
            }

            match self.commit_one(planned, &message) {
                Ok(id) => executed.push(ExecutedCommit {
                    id,
                    message,
                    files: planned.files.clone(),
                }),
                Err(GitError::NoStageablePaths) => continue,
                Err(cause) => {
                    return Err(ExecutionFailure {
                        executed,
                        error: ExecutionError::Commit {
                            commit_index: index,
                            total,
                            planned: planned.clone(),
                            cause,
                        },
                    })
                }
            }
        }

        if !self.dry_run && executed.is_empty() {
            return Err(ExecutionFailure {
                executed,
                error: ExecutionError::NothingExecuted,
            });
        }
        Ok(executed)
    }

    fn commit_one(&self, planned: &PlannedCommit, message: &str) -> Result<String, GitError> {
        self.git.unstage_all()?;
        self.git.stage(&planned.files)?;
        self.git.commit(message)
    }
}
