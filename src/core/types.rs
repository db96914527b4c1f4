//! core::types
//!
//! Strong types for the commit planning domain.
//!
//! # Types
//!
//! - [`FileStatus`] / [`FileChange`] - A single pending change in the working tree
//! - [`WorkingTreeStatus`] - Pending paths grouped by category
//! - [`CommitRules`] - Constraints a planned commit must satisfy
//! - [`PlannedCommit`] / [`CommitPlan`] - The planner's proposal
//! - [`ExecutedCommit`] - A commit that was actually materialized
//! - [`RebaseCommit`] - A recent commit as seen by the history wizard
//!
//! # Examples
//!
//! ```
//! use commitweave::core::types::PlannedCommit;
//!
//! let commit = PlannedCommit::new("feat", Some("auth"), "add logout", vec!["src/auth.rs".into()]);
//! assert_eq!(commit.full_message(), "feat(auth): add logout");
//! ```

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Id reported for commits synthesized in dry-run mode.
pub const DRY_RUN_ID: &str = "(dry-run)";

/// Commit types accepted when the repository sets no type policy.
pub const DEFAULT_COMMIT_TYPES: &[&str] = &[
    "feat", "fix", "docs", "style", "refactor", "perf", "test", "build", "ci", "chore", "revert",
];

/// Default maximum length of a commit message (the part after `type(scope): `).
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 72;

/// How a path changed relative to HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Modified,
    Added,
    Deleted,
    Renamed,
    Untracked,
}

impl FileStatus {
    /// Lowercase label used in prompts and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Modified => "modified",
            FileStatus::Added => "added",
            FileStatus::Deleted => "deleted",
            FileStatus::Renamed => "renamed",
            FileStatus::Untracked => "untracked",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single changed path with its diff summary.
///
/// For renames, `path` is the new path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileChange {
    /// Repo-relative, forward-slash path
    pub path: String,
    /// Change category
    pub status: FileStatus,
    /// Scope assigned from the repo's scope rules
    pub scope: Option<String>,
    /// Either `+N -M` or `+binary -binary`
    pub summary: String,
}

impl FileChange {
    /// Create a change with an empty summary and no scope.
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
            scope: None,
            summary: String::new(),
        }
    }

    /// Build the `+A -D` summary from numstat counts.
    ///
    /// Binary files report `-` for both counts, which maps to `binary`.
    ///
    /// ```
    /// use commitweave::core::types::FileChange;
    ///
    /// assert_eq!(FileChange::summary_from_counts("3", "1"), "+3 -1");
    /// assert_eq!(FileChange::summary_from_counts("-", "-"), "+binary -binary");
    /// ```
    pub fn summary_from_counts(added: &str, removed: &str) -> String {
        let norm = |v: &str| if v == "-" { "binary".to_string() } else { v.to_string() };
        format!("+{} -{}", norm(added), norm(removed))
    }
}

/// Pending paths grouped by category.
///
/// A path appears in at most one of the change categories, but may also
/// appear in `staged`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingTreeStatus {
    pub modified: Vec<String>,
    pub added: Vec<String>,
    pub deleted: Vec<String>,
    pub renamed: Vec<String>,
    pub untracked: Vec<String>,
    /// Paths with index-side changes
    pub staged: Vec<String>,
}

impl WorkingTreeStatus {
    /// Whether there is anything to commit.
    pub fn has_changes(&self) -> bool {
        !(self.modified.is_empty()
            && self.added.is_empty()
            && self.deleted.is_empty()
            && self.renamed.is_empty()
            && self.untracked.is_empty())
    }

    /// Deduplicated union of every change category, excluding `staged`.
    pub fn all_files(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for path in self
            .modified
            .iter()
            .chain(&self.added)
            .chain(&self.deleted)
            .chain(&self.renamed)
            .chain(&self.untracked)
        {
            if seen.insert(path.as_str()) {
                out.push(path.clone());
            }
        }
        out
    }

    /// Category of a path, if it is pending.
    pub fn status_of(&self, path: &str) -> Option<FileStatus> {
        let contains = |list: &[String]| list.iter().any(|p| p == path);
        if contains(&self.renamed) {
            Some(FileStatus::Renamed)
        } else if contains(&self.added) {
            Some(FileStatus::Added)
        } else if contains(&self.deleted) {
            Some(FileStatus::Deleted)
        } else if contains(&self.untracked) {
            Some(FileStatus::Untracked)
        } else if contains(&self.modified) {
            Some(FileStatus::Modified)
        } else {
            None
        }
    }
}

/// Constraints every planned commit must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRules {
    /// Commit types the plan may use; never empty
    pub allowed_types: Vec<String>,
    /// Maximum message length in characters
    pub max_message_length: usize,
    /// Free-text guidance on how to classify test-only changes
    pub behavioral_test: String,
}

impl Default for CommitRules {
    fn default() -> Self {
        Self {
            allowed_types: DEFAULT_COMMIT_TYPES.iter().map(|t| t.to_string()).collect(),
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            behavioral_test: String::new(),
        }
    }
}

impl CommitRules {
    /// Whether `commit_type` is in the allowed list.
    pub fn allows(&self, commit_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == commit_type)
    }
}

/// One commit proposed by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlannedCommit {
    #[serde(rename = "type")]
    pub commit_type: String,
    #[serde(default)]
    pub scope: Option<String>,
    pub message: String,
    pub files: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

impl PlannedCommit {
    /// Convenience constructor (reasoning left empty).
    pub fn new(
        commit_type: impl Into<String>,
        scope: Option<&str>,
        message: impl Into<String>,
        files: Vec<String>,
    ) -> Self {
        Self {
            commit_type: commit_type.into(),
            scope: scope.map(String::from),
            message: message.into(),
            files,
            reasoning: String::new(),
        }
    }

    /// Render the subject line: `type(scope): message` or `type: message`.
    pub fn full_message(&self) -> String {
        match self.scope.as_deref() {
            Some(scope) if !scope.is_empty() => {
                format!("{}({}): {}", self.commit_type, scope, self.message)
            }
            _ => format!("{}: {}", self.commit_type, self.message),
        }
    }
}

/// Ordered list of planned commits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommitPlan {
    pub commits: Vec<PlannedCommit>,
}

impl CommitPlan {
    pub fn new(commits: Vec<PlannedCommit>) -> Self {
        Self { commits }
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Every file across all commits, in plan order.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.commits
            .iter()
            .flat_map(|c| c.files.iter().map(String::as_str))
    }
}

/// A commit that was created (or simulated in dry-run mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedCommit {
    /// Short commit id, or [`DRY_RUN_ID`]
    pub id: String,
    /// Rendered subject line
    pub message: String,
    pub files: Vec<String>,
}

impl ExecutedCommit {
    pub fn is_dry_run(&self) -> bool {
        self.id == DRY_RUN_ID
    }
}

/// A recent commit, enriched with its pushed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseCommit {
    pub id: String,
    pub short_id: String,
    /// Subject line
    pub message: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    /// Reachable from some remote-tracking branch
    pub pushed: bool,
}
