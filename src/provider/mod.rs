//! provider
//!
//! Abstraction over the language model that proposes commit plans.
//!
//! # Architecture
//!
//! The [`Provider`] trait is the only thing the planner depends on.
//! Commands obtain one through [`create_provider`] rather than importing
//! a specific adapter.
//!
//! # Modules
//!
//! - `traits`: `Provider`, `AnalysisRequest`, `ProviderError`
//! - [`retry`]: bounded retry with backoff and cancellation racing
//! - [`openai`]: OpenAI-compatible chat completions adapter
//! - [`anthropic`]: Anthropic Messages API adapter
//! - [`mock`]: scripted provider for deterministic tests
//! - `factory`: provider selection and creation

pub mod anthropic;
mod factory;
mod http;
pub mod mock;
pub mod openai;
pub mod retry;
mod traits;

pub use factory::{create_provider, create_provider_with_env, valid_provider_names, ProviderKind};
pub use traits::*;
