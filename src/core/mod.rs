//! core
//!
//! Core domain types, path rules, and configuration for commitweave.
//!
//! # Modules
//!
//! - [`types`] - Domain types: FileChange, CommitPlan, ExecutedCommit, etc.
//! - [`paths`] - Path normalization and the path-safety predicate
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Nothing in `core` touches the repository or the network
//! - Everything here is deterministic and unit-testable

pub mod config;
pub mod paths;
pub mod types;
