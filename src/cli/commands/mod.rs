//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the repository and loads configuration
//! 2. Calls the planner, executor, or rebase driver
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! `commit` and `message` talk to an LLM provider, which is async. They
//! build a runtime per invocation and block on the future, with Ctrl-C wired
//! to the context's cancellation token.

mod commit;
mod completion;
mod config_cmd;
mod message;
mod rebase;
mod reverse;

pub use commit::commit;
pub use completion::completion;
pub use config_cmd::{path as config_path, show as config_show};
pub use message::message;
pub use rebase::rebase;
pub use reverse::reverse;

use std::future::Future;

use anyhow::{Context as _, Result};

use crate::cli::args::{Command, ConfigAction};
use crate::core::config::Config;
use crate::engine::Context;
use crate::git::Git;
use crate::provider::{create_provider, Provider};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Commit {
            dry_run,
            single,
            yes,
            allow_sensitive,
            max_diff,
        } => commit::commit(ctx, dry_run, single, yes, allow_sensitive, max_diff),
        Command::Message { commit, yes } => message::message(ctx, commit, yes),
        Command::Reverse { count, force } => reverse::reverse(ctx, count, force),
        Command::Rebase { force } => rebase::rebase(ctx, force),
        Command::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => config_cmd::show(ctx),
            ConfigAction::Path => config_cmd::path(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Open the repository the context points at.
pub(crate) fn open_git(ctx: &Context) -> Result<Git> {
    let cwd = ctx
        .work_dir()
        .context("Failed to determine working directory")?;
    let git = Git::open(&cwd)
        .context("Failed to open repository")?
        .with_cancel(ctx.cancel.clone())
        .with_verbosity(ctx.verbosity());
    Ok(git)
}

/// Load global and repo configuration for `git`'s repository.
pub(crate) fn load_config(git: &Git) -> Result<Config> {
    let loaded = Config::load(Some(git.work_dir())).context("Failed to load config")?;
    Ok(loaded.config)
}

/// Build the configured provider.
pub(crate) fn provider_for(config: &Config) -> Result<Box<dyn Provider>> {
    create_provider(&config.provider(), config.provider_timeout_secs())
        .context("Failed to set up the LLM provider")
}

/// Run `fut` to completion on a fresh runtime; Ctrl-C cancels `ctx.cancel`.
pub(crate) fn block_on_cancellable<F: Future>(ctx: &Context, fut: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let cancel = ctx.cancel.clone();
    Ok(rt.block_on(async move {
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
        let output = fut.await;
        watcher.abort();
        output
    }))
}
