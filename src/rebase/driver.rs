//! rebase::driver
//!
//! Runs an edit list through `git rebase -i` without a human at the editor.
//!
//! # Mechanism
//!
//! All scratch files live in one temporary directory owned by a single
//! [`RebaseDriver::execute`] call and removed when it returns:
//!
//! - `todo`: one `op short-id subject` line per entry
//! - `sequence-editor.sh`: copies `todo` over the file git asks it to edit;
//!   exported as `GIT_SEQUENCE_EDITOR`
//! - `msg_N.txt`, `counter`, `editor.sh`: the message hook, exported as
//!   `GIT_EDITOR`. Each invocation reads N from `counter`, writes N+1, and
//!   copies `msg_N.txt` over its argument when that file exists
//!
//! The message hook relies on git opening the editor serially, in todo
//! order: once per `reword`, and once at the end of every squash chain.
//! When no entry carries a replacement message, `GIT_EDITOR` is `true`.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use thiserror::Error;

use super::{find_squash_parent, RebaseEntry, RebaseOp};
use crate::git::{Git, GitError};

/// Errors from the rebase driver.
#[derive(Debug, Error)]
pub enum RebaseError {
    #[error("nothing to rebase")]
    Empty,

    #[error("entry {}: {reason}", .index + 1)]
    InvalidEntry { index: usize, reason: String },

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("failed to prepare rebase scratch files: {0}")]
    Scratch(#[from] std::io::Error),

    /// git rebase exited non-zero. `aborted` is false when the rebase
    /// could not be rolled back and is still in progress.
    #[error("rebase failed{}:\n{output}", abort_note(.aborted))]
    Failed { output: String, aborted: bool },
}

impl RebaseError {
    /// Whether this error left a rebase in progress.
    pub fn left_in_progress(&self) -> bool {
        matches!(self, RebaseError::Failed { aborted: false, .. })
    }
}

fn abort_note(aborted: &bool) -> &'static str {
    if *aborted {
        ""
    } else {
        " and could not be aborted; run `git rebase --abort`"
    }
}

/// Quote `s` for a POSIX shell.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn write_script(path: &Path, body: &str) -> std::io::Result<()> {
    fs::write(path, body)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}

/// Reject lists git would refuse or that cannot carry their messages.
pub fn check_entries(entries: &[RebaseEntry]) -> Result<(), RebaseError> {
    if entries.is_empty() {
        return Err(RebaseError::Empty);
    }
    for (index, entry) in entries.iter().enumerate() {
        match entry.op {
            RebaseOp::Reword if entry.new_message.trim().is_empty() => {
                return Err(RebaseError::InvalidEntry {
                    index,
                    reason: "reword needs a new message".to_string(),
                })
            }
            RebaseOp::Squash if find_squash_parent(entries, index).is_none() => {
                return Err(RebaseError::InvalidEntry {
                    index,
                    reason: "squash has no earlier pick to fold into".to_string(),
                })
            }
            _ => {}
        }
    }
    Ok(())
}

/// Messages for each editor invocation, in order. `None` keeps git's default.
pub fn editor_messages(entries: &[RebaseEntry]) -> Vec<Option<String>> {
    let mut messages = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        match entry.op {
            RebaseOp::Reword => messages.push(Some(entry.new_message.clone())),
            RebaseOp::Squash => {
                let chain_ends = entries.get(i + 1).map(|e| e.op) != Some(RebaseOp::Squash);
                if chain_ends {
                    let parent = find_squash_parent(entries, i).and_then(|p| entries.get(p));
                    messages.push(
                        parent
                            .filter(|p| p.edited && !p.new_message.is_empty())
                            .map(|p| p.new_message.clone()),
                    );
                }
            }
            RebaseOp::Pick | RebaseOp::Drop => {}
        }
    }
    messages
}

/// The todo list text.
pub fn todo_text(entries: &[RebaseEntry]) -> String {
    entries
        .iter()
        .map(|e| e.todo_line() + "\n")
        .collect()
}

/// Rebase driver.
pub struct RebaseDriver<'a> {
    git: &'a Git,
}

impl<'a> RebaseDriver<'a> {
    pub fn new(git: &'a Git) -> Self {
        Self { git }
    }

    /// Apply `entries` (oldest first) on top of `base_ref`; an empty
    /// `base_ref` rebases from the root.
    pub fn execute(&self, entries: &[RebaseEntry], base_ref: &str) -> Result<(), RebaseError> {
        check_entries(entries)?;

        let scratch = TempDir::new()?;
        let dir = scratch.path();
        let env = Self::materialize(dir, entries)?;

        let base = (!base_ref.is_empty()).then_some(base_ref);
        let out = self.git.rebase_interactive(base, &env)?;
        if out.success() {
            return Ok(());
        }

        let aborted = if self.git.is_rebase_in_progress() {
            self.git.abort_rebase().is_ok() && !self.git.is_rebase_in_progress()
        } else {
            true
        };
        Err(RebaseError::Failed {
            output: out.combined().trim().to_string(),
            aborted,
        })
    }

    /// Write the scratch files; return the editor environment.
    fn materialize(dir: &Path, entries: &[RebaseEntry]) -> Result<Vec<(&'static str, String)>, RebaseError> {
        let todo = dir.join("todo");
        fs::write(&todo, todo_text(entries))?;

        let sequence_editor = dir.join("sequence-editor.sh");
        write_script(
            &sequence_editor,
            &format!(
                "#!/bin/sh\ncat {} > \"$1\"\n",
                shell_quote(&todo.to_string_lossy())
            ),
        )?;

        let messages = editor_messages(entries);
        let editor = if messages.iter().any(Option::is_some) {
            for (n, message) in messages.iter().enumerate() {
                if let Some(message) = message {
                    fs::write(dir.join(format!("msg_{}.txt", n)), format!("{}\n", message))?;
                }
            }
            fs::write(dir.join("counter"), "0")?;

            let script = dir.join("editor.sh");
            write_script(
                &script,
                &format!(
                    "#!/bin/sh\n\
                     dir={}\n\
                     n=$(cat \"$dir/counter\")\n\
                     echo $((n + 1)) > \"$dir/counter\"\n\
                     if [ -f \"$dir/msg_$n.txt\" ]; then\n\
                     \x20 cat \"$dir/msg_$n.txt\" > \"$1\"\n\
                     fi\n",
                    shell_quote(&dir.to_string_lossy())
                ),
            )?;
            shell_quote(&script.to_string_lossy())
        } else {
            "true".to_string()
        };

        Ok(vec![
            (
                "GIT_SEQUENCE_EDITOR",
                shell_quote(&sequence_editor.to_string_lossy()),
            ),
            ("GIT_EDITOR", editor),
        ])
    }
}
