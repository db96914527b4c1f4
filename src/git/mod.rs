//! git
//!
//! Single interface for all repository operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. Everything else in the crate
//! (planner, executor, rebase driver, wizard) talks to the repository
//! through [`Git`]. Operations shell out to the host `git` binary; only
//! repository discovery goes through `git2`.
//!
//! # Responsibilities
//!
//! - Repository discovery
//! - Status, diffs, and diff statistics
//! - Staging with post-condition verification
//! - Commit creation and soft-reset reversal
//! - Commit history with pushed/local-only flags
//! - Interactive rebase invocation
//!
//! # Invariants
//!
//! - No subprocess is started after the cancellation token fires
//! - Every mutating call drops the cached status
//! - Output parsing lives in [`parse`] and is pure
//!
//! # Example
//!
//! ```ignore
//! use commitweave::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! git.stage(&["src/lib.rs".to_string()])?;
//! let id = git.commit("feat: add widgets")?;
//! ```

mod interface;
pub mod parse;

pub use interface::{Git, GitError, GitOutput, MAX_COMMIT_MESSAGE_LENGTH};
