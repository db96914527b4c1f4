//! reverse command - Undo recent commits into the working tree

use anyhow::{Context as _, Result};

use super::open_git;
use crate::engine::Context;
use crate::git::Git;
use crate::ui::output;

/// Undo the last `count` commits, keeping their changes unstaged.
pub fn reverse(ctx: &Context, count: usize, force: bool) -> Result<()> {
    let verbosity = ctx.verbosity();
    let git = open_git(ctx)?;

    let subjects = subjects_to_undo(&git, count)?;
    git.reverse(count, force)
        .with_context(|| format!("Failed to undo {} commit(s)", count))?;

    output::print(format!("Undid {} commit(s):", count), verbosity);
    output::print(output::format_list(&subjects, "  "), verbosity);
    output::print("Their changes are in the working tree, unstaged.", verbosity);
    Ok(())
}

/// Subjects of the commits `reverse` is about to undo, newest first.
fn subjects_to_undo(git: &Git, count: usize) -> Result<Vec<String>> {
    git.recent_commit_subjects(count)
        .with_context(|| format!("Failed to read the last {} commit subject(s)", count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::GitError;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn subject_read_failure_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let git = Git::open(dir.path()).unwrap().with_cancel(cancel);

        let err = subjects_to_undo(&git, 2).unwrap_err();
        assert_eq!(err.to_string(), "Failed to read the last 2 commit subject(s)");
        assert!(matches!(
            err.downcast_ref::<GitError>(),
            Some(GitError::Cancelled)
        ));
    }
}
