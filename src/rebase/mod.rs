//! rebase
//!
//! Edit lists for interactive history rewriting, and the driver that
//! replays them through `git rebase -i`.
//!
//! # Edit Lists
//!
//! An edit list is a `Vec<RebaseEntry>` in chronological order (oldest
//! first), which is the order the rebase applies them. Squash entries fold
//! into the nearest preceding `pick`.
//!
//! # Modules
//!
//! - [`driver`]: materializes the todo list and editor hooks, runs the rebase

pub mod driver;

use std::fmt;

use crate::core::types::RebaseCommit;

pub use driver::{RebaseDriver, RebaseError};

/// What to do with a commit during the rebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebaseOp {
    #[default]
    Pick,
    Squash,
    Reword,
    Drop,
}

impl RebaseOp {
    /// Todo-list keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            RebaseOp::Pick => "pick",
            RebaseOp::Squash => "squash",
            RebaseOp::Reword => "reword",
            RebaseOp::Drop => "drop",
        }
    }

    /// `pick → squash → reword → drop → pick`.
    pub fn next(self) -> Self {
        match self {
            RebaseOp::Pick => RebaseOp::Squash,
            RebaseOp::Squash => RebaseOp::Reword,
            RebaseOp::Reword => RebaseOp::Drop,
            RebaseOp::Drop => RebaseOp::Pick,
        }
    }
}

impl fmt::Display for RebaseOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the edit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseEntry {
    pub commit: RebaseCommit,
    pub op: RebaseOp,
    /// Replacement message; empty means "keep"
    pub new_message: String,
    /// The user edited the message by hand
    pub edited: bool,
}

impl RebaseEntry {
    /// A `pick` entry for `commit`.
    pub fn pick(commit: RebaseCommit) -> Self {
        Self {
            commit,
            op: RebaseOp::Pick,
            new_message: String::new(),
            edited: false,
        }
    }

    /// The replacement message if set, otherwise the original subject.
    pub fn effective_message(&self) -> &str {
        if self.new_message.is_empty() {
            &self.commit.message
        } else {
            &self.new_message
        }
    }

    /// `op short-id subject` (the original subject, always).
    pub fn todo_line(&self) -> String {
        format!("{} {} {}", self.op, self.commit.short_id, self.commit.message)
    }
}

/// Entry `i` is a `pick` immediately followed by a `squash`.
pub fn is_squash_parent(entries: &[RebaseEntry], i: usize) -> bool {
    matches!(entries.get(i), Some(e) if e.op == RebaseOp::Pick)
        && matches!(entries.get(i + 1), Some(e) if e.op == RebaseOp::Squash)
}

/// Indices of the contiguous `squash` run after the `pick` at `i`.
pub fn squash_children(entries: &[RebaseEntry], i: usize) -> Vec<usize> {
    match entries.get(i) {
        Some(e) if e.op == RebaseOp::Pick => (i + 1..entries.len())
            .take_while(|&k| entries[k].op == RebaseOp::Squash)
            .collect(),
        _ => Vec::new(),
    }
}

/// The greatest `i < j` whose entry is a `pick`.
pub fn find_squash_parent(entries: &[RebaseEntry], j: usize) -> Option<usize> {
    (0..j.min(entries.len()))
        .rev()
        .find(|&i| entries[i].op == RebaseOp::Pick)
}

/// Number of entries already on a remote.
pub fn count_pushed(entries: &[RebaseEntry]) -> usize {
    entries.iter().filter(|e| e.commit.pushed).count()
}

/// Parent message followed by each child's message, blank-line separated.
pub fn combined_squash_message(entries: &[RebaseEntry], parent: usize) -> String {
    let mut parts = Vec::new();
    if let Some(entry) = entries.get(parent) {
        parts.push(entry.effective_message().to_string());
    }
    for child in squash_children(entries, parent) {
        parts.push(entries[child].effective_message().to_string());
    }
    parts.join("\n\n")
}

/// Picks that fold squashes but whose message was not edited.
pub fn squash_parents_needing_message(entries: &[RebaseEntry]) -> Vec<usize> {
    (0..entries.len())
        .filter(|&i| is_squash_parent(entries, i) && !entries[i].edited)
        .collect()
}

/// Entries for rebasing onto `commits[selected]`.
///
/// `commits` is newest first; the result is the commits newer than the
/// selection, oldest first. With `selected == commits.len()` (the root row)
/// every commit is included.
pub fn entries_after(commits: &[RebaseCommit], selected: usize) -> Vec<RebaseEntry> {
    commits[..selected.min(commits.len())]
        .iter()
        .rev()
        .cloned()
        .map(RebaseEntry::pick)
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{TimeZone, Utc};

    pub fn commit(id: &str, subject: &str) -> RebaseCommit {
        RebaseCommit {
            id: format!("{:0<40}", id),
            short_id: id.to_string(),
            message: subject.to_string(),
            author: "Test".to_string(),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            pushed: false,
        }
    }

    pub fn entries(ops: &[RebaseOp]) -> Vec<RebaseEntry> {
        ops.iter()
            .enumerate()
            .map(|(i, op)| RebaseEntry {
                op: *op,
                ..RebaseEntry::pick(commit(&format!("c{}", i), &format!("subject {}", i)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{commit, entries};
    use super::*;
    use super::RebaseOp::*;

    #[test]
    fn op_cycle() {
        assert_eq!(Pick.next(), Squash);
        assert_eq!(Squash.next(), Reword);
        assert_eq!(Reword.next(), Drop);
        assert_eq!(Drop.next(), Pick);
    }

    #[test]
    fn todo_line_uses_original_subject() {
        let mut entry = RebaseEntry::pick(commit("abc1234", "old subject"));
        entry.op = Reword;
        entry.new_message = "new subject".to_string();
        assert_eq!(entry.todo_line(), "reword abc1234 old subject");
        assert_eq!(entry.effective_message(), "new subject");
    }

    mod squash_helpers {
        use super::*;

        #[test]
        fn is_squash_parent_requires_pick_then_squash() {
            let list = entries(&[Pick, Squash, Reword, Squash]);
            assert!(is_squash_parent(&list, 0));
            assert!(!is_squash_parent(&list, 1));
            assert!(!is_squash_parent(&list, 2));
            assert!(!is_squash_parent(&list, 3));
        }

        #[test]
        fn squash_children_is_contiguous_run() {
            let list = entries(&[Pick, Squash, Squash, Pick, Squash]);
            assert_eq!(squash_children(&list, 0), vec![1, 2]);
            assert_eq!(squash_children(&list, 3), vec![4]);
            assert!(squash_children(&list, 1).is_empty());
        }

        #[test]
        fn find_squash_parent_walks_back_to_pick() {
            let list = entries(&[Drop, Pick, Reword, Squash, Squash]);
            assert_eq!(find_squash_parent(&list, 4), Some(1));
            assert_eq!(find_squash_parent(&list, 1), None);
            assert_eq!(find_squash_parent(&list, 0), None);
        }

        #[test]
        fn combined_message_joins_with_blank_lines() {
            let list = entries(&[Pick, Squash, Squash]);
            assert_eq!(
                combined_squash_message(&list, 0),
                "subject 0\n\nsubject 1\n\nsubject 2"
            );
        }

        #[test]
        fn edited_parents_need_no_prompt() {
            let mut list = entries(&[Pick, Squash, Pick, Squash]);
            list[2].edited = true;
            list[2].new_message = "merged".to_string();
            assert_eq!(squash_parents_needing_message(&list), vec![0]);
        }
    }

    #[test]
    fn count_pushed_totals_flags() {
        let mut list = entries(&[Pick, Pick, Pick]);
        list[0].commit.pushed = true;
        list[2].commit.pushed = true;
        assert_eq!(count_pushed(&list), 2);
    }

    #[test]
    fn entries_after_selection_are_chronological() {
        let commits = vec![commit("d", "D"), commit("c", "C"), commit("b", "B"), commit("a", "A")];
        let list = entries_after(&commits, 2);
        let subjects: Vec<&str> = list.iter().map(|e| e.commit.message.as_str()).collect();
        assert_eq!(subjects, vec!["C", "D"]);

        let all = entries_after(&commits, commits.len());
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].commit.message, "A");
    }
}
