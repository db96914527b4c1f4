//! rebase command - Interactive history rewriting

use anyhow::{Context as _, Result};

use super::open_git;
use crate::engine::Context;
use crate::rebase::RebaseDriver;
use crate::ui::output;
use crate::wizard;

/// Run the history wizard and apply the confirmed edit list.
pub fn rebase(ctx: &Context, force: bool) -> Result<()> {
    let verbosity = ctx.verbosity();
    if !ctx.interactive {
        anyhow::bail!("cw rebase needs an interactive terminal");
    }

    let git = open_git(ctx)?;
    if git.is_rebase_in_progress() {
        anyhow::bail!("A rebase is already in progress; finish or abort it first");
    }

    let Some(outcome) = wizard::run(&git, force).context("History wizard failed")? else {
        output::print("Cancelled; history was not changed.", verbosity);
        return Ok(());
    };

    output::debug(
        format!(
            "rebasing {} entr(ies) onto {}",
            outcome.entries.len(),
            if outcome.base_ref.is_empty() { "--root" } else { outcome.base_ref.as_str() }
        ),
        verbosity,
    );
    match RebaseDriver::new(&git).execute(&outcome.entries, &outcome.base_ref) {
        Ok(()) => {}
        Err(err) if err.left_in_progress() => {
            return Err(anyhow::Error::new(err)
                .context("Rebase failed and is still in progress; resolve it or abort it"));
        }
        Err(err) => {
            return Err(anyhow::Error::new(err).context("Rebase failed; the repository was restored"));
        }
    }

    output::print(
        format!("Rewrote {} commit(s).", outcome.entries.len()),
        verbosity,
    );
    Ok(())
}
