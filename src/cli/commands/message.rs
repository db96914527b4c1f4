//! message command - Suggest a commit message for the staged diff

use anyhow::{Context as _, Result};

use super::{block_on_cancellable, load_config, open_git, provider_for};
use crate::engine::Context;
use crate::planner::{PlanOptions, Planner};
use crate::ui::output;
use crate::ui::prompts;

/// Generate a message for the staged changes; optionally commit with it.
pub fn message(ctx: &Context, commit: bool, yes: bool) -> Result<()> {
    let verbosity = ctx.verbosity();
    let git = open_git(ctx)?;
    let config = load_config(&git)?;
    let provider = provider_for(&config)?;
    let options = PlanOptions::from_config(&config);

    let planner = Planner::new(&git, provider.as_ref(), &config.repo).with_verbosity(verbosity);
    let message = block_on_cancellable(ctx, planner.message(&ctx.cancel, &options))?
        .context("Failed to generate a commit message")?;

    if !commit {
        // The message itself is the output, even in quiet mode.
        println!("{}", message);
        return Ok(());
    }

    output::print(&message, verbosity);
    if !yes && ctx.interactive && !prompts::confirm("Commit with this message?", true, true)? {
        output::print("Aborted; nothing was committed.", verbosity);
        return Ok(());
    }

    let id = git.commit(&message).context("Commit failed")?;
    output::print(format!("[{}] {}", id, message), verbosity);
    Ok(())
}
