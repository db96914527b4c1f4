//! commitweave - split pending changes into conventional commits
//!
//! commitweave asks an LLM to partition the pending changes of a git working
//! tree into a sequence of conventional commits, repairs and validates the
//! proposed plan, and materializes it one commit at a time. A terminal
//! wizard rewrites recent history (reorder, squash, reword, drop) by driving
//! `git rebase -i` without a human at the editor.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates)
//! - [`planner`] - Prompting, reply parsing, and the Validator-Repairer
//! - [`engine`] - Execution context and the plan executor
//! - [`rebase`] - Edit lists and the rebase driver
//! - [`wizard`] - Interactive history editor
//! - [`provider`] - LLM provider abstraction and HTTP adapters
//! - [`git`] - Single interface for all Git operations
//! - [`core`] - Domain types, paths, and configuration
//! - [`ui`] - User interaction utilities
//!
//! # Correctness Invariants
//!
//! 1. Only validated plans reach the executor
//! 2. Git is driven sequentially; each commit stages only its own files
//! 3. A failed rebase is aborted, leaving history as it was
//! 4. Repairs are applied silently but always reported to the caller

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod planner;
pub mod provider;
pub mod rebase;
pub mod ui;
pub mod wizard;
