//! planner::validate
//!
//! The validator-repairer.
//!
//! # Repairs
//!
//! Deterministic fixes applied before validation:
//!
//! - Messages over the limit are cut to `max - 3` characters plus `...`
//! - Commits sharing a file are merged (union-find over commit indices);
//!   each group keeps its first member's type, scope, message, and reasoning
//! - [`scrub_sensitive`] (caller-invoked) drops files that look like
//!   secrets, keys, or credentials
//!
//! # Validation
//!
//! [`validate`] never modifies the plan. It reports every problem with a
//! structured location such as `commits[1].message` or `commits[0].files[2]`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::core::config::RepoConfig;
use crate::core::paths::{basename, is_path_safe};
use crate::core::types::{CommitPlan, PlannedCommit};
use crate::git::MAX_COMMIT_MESSAGE_LENGTH;

/// Basename patterns of files that must not be committed by default.
pub const SENSITIVE_PATTERNS: &[&str] = &[
    ".env",
    ".env.*",
    "*.pem",
    "*.key",
    "*.p12",
    "*.pfx",
    "*.crt",
    "*.jks",
    "*.keystore",
    "id_rsa*",
    "id_dsa*",
    "id_ecdsa*",
    "id_ed25519*",
    "credentials.*",
    "secrets.*",
    "client_secret*.json",
    "service-account*.json",
    "local.settings.json",
    ".npmrc",
    ".pypirc",
    ".netrc",
    ".htpasswd",
];

const ELLIPSIS: &str = "...";

fn sensitive_set() -> &'static GlobSet {
    static SET: OnceLock<GlobSet> = OnceLock::new();
    SET.get_or_init(|| {
        let mut builder = GlobSetBuilder::new();
        for pattern in SENSITIVE_PATTERNS {
            if let Ok(glob) = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .literal_separator(true)
                .build()
            {
                builder.add(glob);
            }
        }
        builder.build().unwrap_or_else(|_| GlobSet::empty())
    })
}

/// Whether the basename of `path` matches a sensitive pattern.
///
/// ```
/// use commitweave::planner::validate::is_sensitive;
///
/// assert!(is_sensitive("deploy/.env.production"));
/// assert!(is_sensitive("certs/Server.PEM"));
/// assert!(!is_sensitive("config/app.yaml"));
/// ```
pub fn is_sensitive(path: &str) -> bool {
    sensitive_set().is_match(basename(path))
}

/// What the repair passes changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Indices (in the input plan) of commits whose message was shortened
    pub truncated: Vec<usize>,
    /// Groups of input indices that were merged, when a group had 2+ members
    pub merged: Vec<Vec<usize>>,
    /// Paths removed by the sensitive-file scrub
    pub scrubbed: Vec<String>,
}

impl RepairReport {
    pub fn is_empty(&self) -> bool {
        self.truncated.is_empty() && self.merged.is_empty() && self.scrubbed.is_empty()
    }
}

/// Shorten `message` to `max` characters, ending in `...`.
pub fn truncate_message(message: &str, max: usize) -> String {
    if message.chars().count() <= max {
        return message.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut out: String = message.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Apply [`truncate_message`] to every commit; return the touched indices.
pub fn truncate_messages(plan: &mut CommitPlan, max: usize) -> Vec<usize> {
    let mut touched = Vec::new();
    for (i, commit) in plan.commits.iter_mut().enumerate() {
        if commit.message.chars().count() > max {
            commit.message = truncate_message(&commit.message, max);
            touched.push(i);
        }
    }
    touched
}

/// Union-find over commit indices. Roots are always the smallest index.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

fn dedup_in_order(files: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    files.into_iter().filter(|f| seen.insert(f.clone())).collect()
}

/// Merge commits that share any file.
///
/// Returns the merged plan and the groups (input indices) that were
/// collapsed. Group order follows each group's first member.
pub fn merge_overlaps(plan: CommitPlan) -> (CommitPlan, Vec<Vec<usize>>) {
    let n = plan.commits.len();
    let mut sets = DisjointSet::new(n);
    let mut owner: HashMap<&str, usize> = HashMap::new();

    for (i, commit) in plan.commits.iter().enumerate() {
        for file in &commit.files {
            match owner.get(file.as_str()) {
                Some(&j) => sets.union(i, j),
                None => {
                    owner.insert(file.as_str(), i);
                }
            }
        }
    }

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in 0..n {
        let root = sets.find(i);
        groups.entry(root).or_default().push(i);
    }

    let mut slots: Vec<Option<PlannedCommit>> = plan.commits.into_iter().map(Some).collect();
    let mut commits = Vec::with_capacity(groups.len());
    let mut merged = Vec::new();

    for (_, members) in groups {
        let mut files = Vec::new();
        let mut head: Option<PlannedCommit> = None;
        for &i in &members {
            if let Some(commit) = slots[i].take() {
                files.extend(commit.files.iter().cloned());
                if head.is_none() {
                    head = Some(commit);
                }
            }
        }
        if let Some(mut commit) = head {
            commit.files = dedup_in_order(files);
            commits.push(commit);
        }
        if members.len() > 1 {
            merged.push(members);
        }
    }

    (CommitPlan::new(commits), merged)
}

/// Collapse the whole plan into its first commit.
pub fn collapse_to_single(plan: CommitPlan) -> (CommitPlan, Option<Vec<usize>>) {
    if plan.len() <= 1 {
        return (plan, None);
    }
    let indices: Vec<usize> = (0..plan.len()).collect();
    let mut commits = plan.commits.into_iter();
    let Some(mut head) = commits.next() else {
        return (CommitPlan::default(), None);
    };
    let rest: Vec<String> = commits.flat_map(|c| c.files).collect();
    head.files = dedup_in_order(head.files.into_iter().chain(rest));
    (CommitPlan::new(vec![head]), Some(indices))
}

/// Run the deterministic repairs: message truncation, then overlap merge.
pub fn repair(mut plan: CommitPlan, max_message_length: usize) -> (CommitPlan, RepairReport) {
    let truncated = truncate_messages(&mut plan, max_message_length);
    let (plan, merged) = merge_overlaps(plan);
    (
        plan,
        RepairReport {
            truncated,
            merged,
            scrubbed: Vec::new(),
        },
    )
}

/// Remove sensitive files; drop commits left empty.
///
/// Returns the scrubbed plan and the removed paths in plan order.
pub fn scrub_sensitive(plan: CommitPlan) -> (CommitPlan, Vec<String>) {
    let mut removed = Vec::new();
    let commits = plan
        .commits
        .into_iter()
        .filter_map(|mut commit| {
            let (hit, keep): (Vec<String>, Vec<String>) =
                commit.files.into_iter().partition(|f| is_sensitive(f));
            removed.extend(hit);
            commit.files = keep;
            (!commit.files.is_empty()).then_some(commit)
        })
        .collect();
    (CommitPlan::new(commits), removed)
}

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// `commits`, `commits[i].field`, or `commits[i].files[j]`
    pub location: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Result of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationVerdict {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationVerdict {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            location: location.into(),
            message: message.into(),
        });
    }
}

impl fmt::Display for ValidationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "plan is valid");
        }
        let lines: Vec<String> = self.issues.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Inputs for [`validate`].
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Repository root, for the on-disk existence check
    pub root: PathBuf,
    /// Type policy source
    pub repo: RepoConfig,
    pub max_message_length: usize,
    /// Paths reported by status
    pub known: HashSet<String>,
}

/// Check a (repaired) plan without modifying it.
pub fn validate(plan: &CommitPlan, ctx: &ValidationContext) -> ValidationVerdict {
    let mut verdict = ValidationVerdict::default();

    if plan.is_empty() {
        verdict.push("commits", "plan has no commits");
        return verdict;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (i, commit) in plan.commits.iter().enumerate() {
        let at = |field: &str| format!("commits[{}].{}", i, field);

        if commit.commit_type.trim().is_empty() {
            verdict.push(at("type"), "type is empty");
        } else if !ctx.repo.is_type_allowed(&commit.commit_type) {
            verdict.push(
                at("type"),
                format!(
                    "type '{}' is not allowed (allowed: {})",
                    commit.commit_type,
                    ctx.repo.allowed_types().join("|")
                ),
            );
        }

        let length = commit.message.chars().count();
        if commit.message.trim().is_empty() {
            verdict.push(at("message"), "message is empty");
        } else if length > ctx.max_message_length {
            verdict.push(
                at("message"),
                format!(
                    "message is {} characters, maximum is {}",
                    length, ctx.max_message_length
                ),
            );
        } else {
            let rendered = commit.full_message().chars().count();
            if rendered > MAX_COMMIT_MESSAGE_LENGTH {
                verdict.push(
                    at("message"),
                    format!(
                        "rendered subject is {} characters, git limit is {}",
                        rendered, MAX_COMMIT_MESSAGE_LENGTH
                    ),
                );
            }
        }

        if commit.files.is_empty() {
            verdict.push(at("files"), "commit has no files");
        }

        for (j, file) in commit.files.iter().enumerate() {
            let location = format!("commits[{}].files[{}]", i, j);

            if !is_path_safe(file) {
                verdict.push(location, format!("unsafe path '{}'", file));
                continue;
            }

            if !ctx.known.contains(file) && !ctx.root.join(file).exists() {
                verdict.push(
                    location.clone(),
                    format!("'{}' is not a changed path and does not exist", file),
                );
            }

            match seen.get(file.as_str()) {
                Some(&other) if other != i => verdict.push(
                    location,
                    format!("'{}' is also listed in commits[{}]", file, other),
                ),
                Some(_) => verdict.push(location, format!("'{}' is listed twice", file)),
                None => {
                    seen.insert(file.as_str(), i);
                }
            }
        }
    }

    verdict
}
