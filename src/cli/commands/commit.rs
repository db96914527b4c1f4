//! commit command - Plan and execute commits for the pending changes

use anyhow::{bail, Context as _, Result};

use super::{block_on_cancellable, load_config, open_git, provider_for};
use crate::engine::{Context, Executor};
use crate::planner::validate::scrub_sensitive;
use crate::planner::{PlanOptions, Planner, RepairReport};
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts;

/// Plan, review, and execute commits for the working tree.
pub fn commit(
    ctx: &Context,
    dry_run: bool,
    single: bool,
    yes: bool,
    allow_sensitive: bool,
    max_diff: Option<usize>,
) -> Result<()> {
    let verbosity = ctx.verbosity();
    let git = open_git(ctx)?;
    let config = load_config(&git)?;
    let provider = provider_for(&config)?;

    let mut options = PlanOptions::from_config(&config);
    options.single_commit = single;
    if let Some(max) = max_diff {
        options.max_diff_chars = max;
    }

    output::print(
        format!("Planning commits with {}...", provider.name()),
        verbosity,
    );
    let planner = Planner::new(&git, provider.as_ref(), &config.repo).with_verbosity(verbosity);
    let outcome = block_on_cancellable(ctx, planner.plan(&ctx.cancel, &options))?
        .context("Planning failed")?;

    let mut plan = outcome.plan;
    let mut repairs = outcome.repairs;
    if outcome.diff_truncated {
        output::warn(
            format!(
                "diff exceeded {} characters and was truncated for the provider",
                options.max_diff_chars
            ),
            verbosity,
        );
    }
    if !allow_sensitive {
        let (scrubbed, removed) = scrub_sensitive(plan);
        plan = scrubbed;
        repairs.scrubbed = removed;
    }
    report_repairs(&repairs, verbosity);

    if !outcome.verdict.is_valid() {
        bail!("The proposed plan is invalid:\n{}", outcome.verdict);
    }
    if plan.is_empty() {
        bail!("Nothing left to commit after removing sensitive files");
    }

    output::print(format!("\n{}\n", output::format_plan(&plan)), verbosity);

    if !dry_run && !yes && ctx.interactive {
        let proceed = prompts::confirm(&format!("Create {} commit(s)?", plan.len()), true, true)?;
        if !proceed {
            output::print("Aborted; nothing was committed.", verbosity);
            return Ok(());
        }
    }

    let executor = Executor::new(&git, dry_run);
    let result = executor.execute_with_progress(&plan, |i, total, planned| {
        output::print(format!("[{}/{}] {}", i, total, planned.full_message()), verbosity);
    });

    match result {
        Ok(executed) => {
            output::debug(output::format_executed(&executed), verbosity);
            let verb = if dry_run { "Would create" } else { "Created" };
            output::print(format!("{} {} commit(s).", verb, executed.len()), verbosity);
            Ok(())
        }
        Err(failure) => {
            if !failure.executed.is_empty() {
                output::warn(
                    format!(
                        "{} commit(s) were created before the failure:\n{}",
                        failure.executed.len(),
                        output::format_executed(&failure.executed)
                    ),
                    verbosity,
                );
            }
            Err(failure.into())
        }
    }
}

/// Disclose the silent repairs as warnings.
fn report_repairs(repairs: &RepairReport, verbosity: Verbosity) {
    if !repairs.truncated.is_empty() {
        output::warn(
            format!(
                "shortened {} commit message(s) to fit the length limit",
                repairs.truncated.len()
            ),
            verbosity,
        );
    }
    for group in &repairs.merged {
        let numbers: Vec<String> = group.iter().map(|i| (i + 1).to_string()).collect();
        output::warn(
            format!(
                "merged proposed commits {} because they shared files",
                numbers.join(", ")
            ),
            verbosity,
        );
    }
    if !repairs.scrubbed.is_empty() {
        output::warn(
            format!(
                "left out sensitive file(s), commit them manually if intended:\n{}",
                output::format_list(&repairs.scrubbed, "  ")
            ),
            verbosity,
        );
    }
}
