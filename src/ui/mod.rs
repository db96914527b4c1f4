//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Yes/no confirmations
//! - [`output`] - Verbosity-aware output and plan formatting
//!
//! # Design
//!
//! All line-oriented output and prompts go through this module so that
//! `--quiet`, `--debug`, and `--no-interactive` behave the same in every
//! command. The full-screen history editor lives in [`crate::wizard`].

pub mod output;
pub mod prompts;
