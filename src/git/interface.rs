//! git::interface
//!
//! The VCS Port: a narrow, typed surface over the host `git` binary.
//!
//! This module provides the **single doorway** to the repository. Every
//! operation runs `git` in the repository's working directory and turns its
//! textual output into typed values via [`super::parse`].
//!
//! # Exit Code Conventions
//!
//! - Exit 1 on diff/status-like calls means "no changes" (empty result)
//! - Exit 128 on log-like calls means "no commits" (empty result)
//! - Any other non-zero exit surfaces as [`GitError::Command`]
//!
//! # Cancellation
//!
//! The port holds a [`CancellationToken`]. Once it is cancelled no new
//! subprocess is started; calls already running complete normally.
//!
//! # Example
//!
//! ```ignore
//! use commitweave::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let status = git.status()?;
//! for path in status.all_files() {
//!     println!("{}", path);
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::parse::{self, LOG_FORMAT};
use crate::core::types::{FileChange, RebaseCommit, WorkingTreeStatus};
use crate::ui::output::{self, Verbosity};

/// Maximum length accepted by [`Git::commit`].
pub const MAX_COMMIT_MESSAGE_LENGTH: usize = 200;

/// Messages from `reset`/`rm --cached` that do not indicate failure.
const BENIGN_UNSTAGE_MESSAGES: &[&str] = &[
    "Unstaged changes after reset",
    "did not match any files",
    "ambiguous argument 'HEAD'",
];

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// The cancellation token fired before the subprocess was started.
    #[error("operation cancelled")]
    Cancelled,

    /// Bad arguments or unmet preconditions.
    #[error("{0}")]
    Precondition(String),

    /// The git binary could not be started.
    #[error("failed to run git: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    /// git exited with an unexpected status.
    #[error("git {args} failed (exit {}): {output}", exit_label(.code))]
    Command {
        /// Space-joined argument vector
        args: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Combined stdout and stderr
        output: String,
    },

    /// The repository has no commits yet.
    #[error("repository has no commits")]
    NoCommits,

    /// Fewer commits exist than the operation needs.
    #[error("cannot go back {requested} commit(s): only {available} commits exist")]
    InsufficientDepth { requested: usize, available: usize },

    /// A destructive operation would rewrite history shared with a remote.
    #[error(
        "{count} commit(s) include history already pushed to a remote; \
         rewriting them will diverge from the remote (re-run with --force to proceed)"
    )]
    Pushed { count: usize },

    /// The path is excluded by ignore rules.
    #[error("'{path}' is ignored by ignore rules")]
    Ignored { path: String },

    /// The path is neither on disk nor tracked.
    #[error("'{path}': file does not exist and is not tracked")]
    MissingFile { path: String },

    /// Every requested path expanded to nothing.
    #[error("no stageable paths (all were directories)")]
    NoStageablePaths,

    /// A path was handed to `git add` but did not end up staged.
    #[error("'{path}' was not staged ({diagnostic})")]
    NotStaged { path: String, diagnostic: String },

    /// Commit requested with an empty index.
    #[error("no staged changes to commit")]
    NothingStaged,

    /// Filesystem error while inspecting the working tree.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "signal".to_string(),
    }
}

/// Captured result of one git invocation.
#[derive(Debug, Clone)]
pub struct GitOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }
}

/// Which baseline a diff compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiffBase {
    /// Index vs HEAD
    Staged,
    /// Worktree vs HEAD
    Head,
    /// Worktree vs index
    Index,
}

/// The Git interface.
///
/// All repository reads and writes flow through this type. It is cheap to
/// construct and holds no open handles; the only state is an optional cache
/// of the last `status` result, dropped by every mutating call.
pub struct Git {
    work_dir: PathBuf,
    cancel: CancellationToken,
    verbosity: Verbosity,
    status_cache: Mutex<Option<WorkingTreeStatus>>,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("work_dir", &self.work_dir)
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Discovery
    // =========================================================================

    /// Find the working-tree root of the repository containing `start`.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if `start` is not inside a repository
    /// - [`GitError::BareRepo`] if the repository has no working tree
    pub fn find_root(start: &Path) -> Result<PathBuf, GitError> {
        let repo = git2::Repository::discover(start).map_err(|_| GitError::NotARepo {
            path: start.to_path_buf(),
        })?;
        let work_dir = repo.workdir().ok_or(GitError::BareRepo)?;
        Ok(work_dir.components().collect())
    }

    /// Whether `dir` is inside a repository with a working tree.
    pub fn is_repo(dir: &Path) -> bool {
        Self::find_root(dir).is_ok()
    }

    /// Open the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let work_dir = Self::find_root(path)?;
        Ok(Self {
            work_dir,
            cancel: CancellationToken::new(),
            verbosity: Verbosity::Normal,
            status_cache: Mutex::new(None),
        })
    }

    /// Attach a cancellation token shared with the caller.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Log every invocation at debug verbosity.
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Absolute path of the working-tree root.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Absolute path of the git directory.
    pub fn git_dir(&self) -> Result<PathBuf, GitError> {
        let out = self.run_checked(&["rev-parse", "--git-dir"])?;
        let path = PathBuf::from(out.trim());
        Ok(if path.is_absolute() {
            path
        } else {
            self.work_dir.join(path)
        })
    }

    // =========================================================================
    // Subprocess plumbing
    // =========================================================================

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(&self.work_dir)
            .env("LC_ALL", "C")
            .stdin(Stdio::null());
        cmd
    }

    fn finish(&self, args: &[&str], output: std::process::Output) -> GitOutput {
        let out = GitOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        output::debug(
            format!("git {} -> {:?}", args.join(" "), out.code),
            self.verbosity,
        );
        out
    }

    fn ensure_not_cancelled(&self) -> Result<(), GitError> {
        if self.cancel.is_cancelled() {
            return Err(GitError::Cancelled);
        }
        Ok(())
    }

    /// Run git and capture its output regardless of exit status.
    pub(crate) fn run(&self, args: &[&str]) -> Result<GitOutput, GitError> {
        self.run_with_env(args, &[])
    }

    /// Run git with extra environment variables.
    pub(crate) fn run_with_env(
        &self,
        args: &[&str],
        env: &[(&str, String)],
    ) -> Result<GitOutput, GitError> {
        self.ensure_not_cancelled()?;
        let mut cmd = self.command(args);
        for (key, value) in env {
            cmd.env(key, value);
        }
        let output = cmd.output().map_err(|source| GitError::Spawn { source })?;
        Ok(self.finish(args, output))
    }

    /// Run git feeding `input` on stdin.
    fn run_with_input(&self, args: &[&str], input: &str) -> Result<GitOutput, GitError> {
        self.ensure_not_cancelled()?;
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| GitError::Spawn { source })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .map_err(|source| GitError::Spawn { source })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|source| GitError::Spawn { source })?;
        Ok(self.finish(args, output))
    }

    fn command_error(args: &[&str], out: &GitOutput) -> GitError {
        GitError::Command {
            args: args.join(" "),
            code: out.code,
            output: out.combined().trim().to_string(),
        }
    }

    /// Run git and return stdout, failing on any non-zero exit.
    fn run_checked(&self, args: &[&str]) -> Result<String, GitError> {
        let out = self.run(args)?;
        if out.success() {
            Ok(out.stdout)
        } else {
            Err(Self::command_error(args, &out))
        }
    }

    /// Diff/status-like call: exit 1 means "no changes".
    fn run_diff_like(&self, args: &[&str]) -> Result<String, GitError> {
        let out = self.run(args)?;
        match out.code {
            Some(0) => Ok(out.stdout),
            Some(1) => Ok(String::new()),
            _ => Err(Self::command_error(args, &out)),
        }
    }

    /// Log-like call: exit 128 means "no commits".
    fn run_log_like(&self, args: &[&str]) -> Result<String, GitError> {
        let out = self.run(args)?;
        match out.code {
            Some(0) => Ok(out.stdout),
            Some(128) => Ok(String::new()),
            _ => Err(Self::command_error(args, &out)),
        }
    }

    fn succeeds(&self, args: &[&str]) -> bool {
        self.run(args).map(|o| o.success()).unwrap_or(false)
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Drop the cached status so the next [`Git::status`] requeries git.
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.status_cache.lock() {
            *cache = None;
        }
    }

    /// Working-tree status with ignored paths filtered out.
    ///
    /// Parses `git status --porcelain`. Ignore filtering is a single batch
    /// `check-ignore --stdin` call and fails open: if it errors, every path
    /// is kept.
    pub fn status(&self) -> Result<WorkingTreeStatus, GitError> {
        if let Ok(cache) = self.status_cache.lock() {
            if let Some(status) = cache.as_ref() {
                return Ok(status.clone());
            }
        }

        let out = self.run_diff_like(&["status", "--porcelain"])?;
        let mut entries = parse::parse_porcelain(&out);

        let paths: Vec<String> = entries.iter().map(|e| e.path.clone()).collect();
        let ignored = self.ignored_among(&paths);
        if !ignored.is_empty() {
            entries.retain(|e| !ignored.contains(&e.path));
        }

        let status = parse::categorize(&entries);
        if let Ok(mut cache) = self.status_cache.lock() {
            *cache = Some(status.clone());
        }
        Ok(status)
    }

    /// The subset of `paths` matched by ignore rules (fail-open).
    fn ignored_among(&self, paths: &[String]) -> HashSet<String> {
        if paths.is_empty() {
            return HashSet::new();
        }
        let mut input = paths.join("\n");
        input.push('\n');

        match self.run_with_input(&["check-ignore", "--stdin"], &input) {
            Ok(out) if out.success() => parse::parse_paths(&out.stdout).into_iter().collect(),
            Ok(_) => HashSet::new(),
            Err(err) => {
                output::debug(
                    format!("check-ignore failed, keeping all paths: {}", err),
                    self.verbosity,
                );
                HashSet::new()
            }
        }
    }

    /// Whether a single path is matched by ignore rules.
    pub fn is_ignored(&self, path: &str) -> bool {
        self.succeeds(&["check-ignore", "-q", "--", path])
    }

    // =========================================================================
    // Diffs
    // =========================================================================

    fn diff_bases(&self, staged_only: bool) -> Vec<DiffBase> {
        if staged_only {
            vec![DiffBase::Staged]
        } else if self.has_head() {
            vec![DiffBase::Head]
        } else {
            vec![DiffBase::Staged, DiffBase::Index]
        }
    }

    fn run_diff(
        &self,
        base: DiffBase,
        flags: &[&str],
        files: &[String],
    ) -> Result<String, GitError> {
        let mut args = vec!["diff"];
        match base {
            DiffBase::Staged => args.push("--staged"),
            DiffBase::Head => args.push("HEAD"),
            DiffBase::Index => {}
        }
        args.extend_from_slice(flags);
        if !files.is_empty() {
            args.push("--");
            args.extend(files.iter().map(String::as_str));
        }
        self.run_diff_like(&args)
    }

    /// Full textual diff against the index (`staged_only`) or the current tip.
    ///
    /// Restrict to `files` when non-empty.
    pub fn diff(&self, staged_only: bool, files: &[String]) -> Result<String, GitError> {
        let mut out = String::new();
        for base in self.diff_bases(staged_only) {
            out.push_str(&self.run_diff(base, &[], files)?);
        }
        Ok(out)
    }

    /// `path -> summary` from `git diff --stat`.
    pub fn diff_stat(
        &self,
        staged_only: bool,
    ) -> Result<std::collections::BTreeMap<String, String>, GitError> {
        let mut stats = std::collections::BTreeMap::new();
        for base in self.diff_bases(staged_only) {
            stats.extend(parse::parse_stat(&self.run_diff(base, &["--stat"], &[])?));
        }
        Ok(stats)
    }

    /// `path -> FileChange` from `git diff --numstat`.
    pub fn diff_numstat(
        &self,
        staged_only: bool,
    ) -> Result<std::collections::BTreeMap<String, FileChange>, GitError> {
        let mut changes = std::collections::BTreeMap::new();
        for base in self.diff_bases(staged_only) {
            changes.extend(parse::parse_numstat(
                &self.run_diff(base, &["--numstat"], &[])?,
            ));
        }
        Ok(changes)
    }

    // =========================================================================
    // History queries
    // =========================================================================

    /// Up to `n` most recent commit subjects, newest first.
    pub fn recent_commit_subjects(&self, n: usize) -> Result<Vec<String>, GitError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let limit = format!("-{}", n);
        let out = self.run_log_like(&["log", "--format=%s", &limit])?;
        Ok(out.lines().map(String::from).collect())
    }

    /// Current branch name (`HEAD` when detached).
    pub fn current_branch(&self) -> Result<String, GitError> {
        match self.run_checked(&["rev-parse", "--abbrev-ref", "HEAD"]) {
            Ok(out) => Ok(out.trim().to_string()),
            // Unborn branch: rev-parse cannot resolve HEAD yet
            Err(err) => self
                .run_checked(&["symbolic-ref", "--short", "HEAD"])
                .map(|out| out.trim().to_string())
                .map_err(|_| err),
        }
    }

    /// Full id of HEAD.
    pub fn head_id(&self) -> Result<String, GitError> {
        self.run_checked(&["rev-parse", "HEAD"])
            .map(|out| out.trim().to_string())
            .map_err(|_| GitError::NoCommits)
    }

    /// Whether HEAD resolves to a commit.
    pub fn has_head(&self) -> bool {
        self.succeeds(&["rev-parse", "--verify", "-q", "HEAD"])
    }

    /// True iff `HEAD~1` does not resolve.
    pub fn is_initial_commit(&self) -> bool {
        !self.succeeds(&["rev-parse", "--verify", "-q", "HEAD~1"])
    }

    /// Whether `refname` is reachable from any remote-tracking branch.
    ///
    /// Any failure (no remotes, unknown ref) yields `false`.
    pub fn is_ref_pushed(&self, refname: &str) -> bool {
        match self.run(&["branch", "-r", "--contains", refname]) {
            Ok(out) => out.success() && !out.stdout.trim().is_empty(),
            Err(_) => false,
        }
    }

    /// Number of commits reachable from HEAD (0 for an unborn branch).
    pub fn commit_count(&self) -> Result<usize, GitError> {
        let out = self.run_log_like(&["rev-list", "--count", "HEAD"])?;
        Ok(out.trim().parse().unwrap_or(0))
    }

    /// Succeeds iff `HEAD~n` exists.
    ///
    /// # Errors
    ///
    /// [`GitError::InsufficientDepth`] carrying the actual commit count.
    pub fn has_commit_depth(&self, n: usize) -> Result<(), GitError> {
        let available = self.commit_count()?;
        if available > n {
            Ok(())
        } else {
            Err(GitError::InsufficientDepth {
                requested: n,
                available,
            })
        }
    }

    /// Commits reachable from HEAD but from no remote-tracking branch.
    fn local_only_set(&self) -> Result<HashSet<String>, GitError> {
        let out = self.run_log_like(&["log", "--format=%H", "HEAD", "--not", "--remotes"])?;
        Ok(out.lines().map(|l| l.trim().to_string()).collect())
    }

    fn enrich(&self, out: &str) -> Result<Vec<RebaseCommit>, GitError> {
        let records = parse::parse_log_records(out);
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let local = self.local_only_set()?;
        Ok(records
            .into_iter()
            .map(|r| RebaseCommit {
                pushed: !local.contains(&r.id),
                id: r.id,
                short_id: r.short_id,
                message: r.subject,
                author: r.author,
                timestamp: r.timestamp,
            })
            .collect())
    }

    /// The `n` most recent commits, newest first, with pushed flags.
    pub fn get_commit_log(&self, n: usize) -> Result<Vec<RebaseCommit>, GitError> {
        let limit = format!("-{}", n);
        let out = self.run_log_like(&["log", LOG_FORMAT, &limit])?;
        self.enrich(&out)
    }

    /// Commits in `from..to`, newest first. An empty `from` means "from the root".
    pub fn get_commits_in_range(&self, from: &str, to: &str) -> Result<Vec<RebaseCommit>, GitError> {
        let range = if from.is_empty() {
            to.to_string()
        } else {
            format!("{}..{}", from, to)
        };
        let out = self.run_log_like(&["log", LOG_FORMAT, &range])?;
        self.enrich(&out)
    }

    /// Paths touched by a commit.
    pub fn commit_files(&self, rev: &str) -> Result<Vec<String>, GitError> {
        let out = self.run_checked(&[
            "diff-tree",
            "--no-commit-id",
            "--name-only",
            "-r",
            "--root",
            rev,
        ])?;
        Ok(parse::parse_paths(&out))
    }

    // =========================================================================
    // Index queries
    // =========================================================================

    /// Paths whose index entry differs from HEAD.
    pub fn staged_files(&self) -> Result<Vec<String>, GitError> {
        let out = self.run_diff_like(&["diff", "--cached", "--name-only"])?;
        Ok(parse::parse_paths(&out))
    }

    /// Renames currently recorded in the index, as `(old, new)`.
    pub fn staged_renames(&self) -> Result<Vec<(String, String)>, GitError> {
        let out = self.run_diff_like(&["diff", "--cached", "--name-status", "-M"])?;
        Ok(parse::parse_renames(&out))
    }

    /// Whether the index has any changes relative to HEAD.
    pub fn has_staged_changes(&self) -> Result<bool, GitError> {
        let args = ["diff", "--cached", "--quiet"];
        let out = self.run(&args)?;
        match out.code {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(Self::command_error(&args, &out)),
        }
    }

    fn index_contains(&self, path: &str) -> Result<bool, GitError> {
        let out = self.run_checked(&["ls-files", "--", path])?;
        Ok(!out.trim().is_empty())
    }

    fn head_contains(&self, path: &str) -> bool {
        self.run(&["ls-tree", "--name-only", "HEAD", "--", path])
            .map(|o| o.success() && !o.stdout.trim().is_empty())
            .unwrap_or(false)
    }

    /// Untracked (non-ignored) and modified files under `dir`, via git's
    /// own listing so ignore rules are honored.
    fn pending_files_in_dir(&self, dir: &str) -> Result<Vec<String>, GitError> {
        let untracked =
            self.run_checked(&["ls-files", "--others", "--exclude-standard", "--", dir])?;
        let modified = self.run_checked(&["ls-files", "--modified", "--", dir])?;

        let mut seen = HashSet::new();
        Ok(parse::parse_paths(&untracked)
            .into_iter()
            .chain(parse::parse_paths(&modified))
            .filter(|p| seen.insert(p.clone()))
            .collect())
    }

    // =========================================================================
    // Index mutations
    // =========================================================================

    /// Stage exactly `files`.
    ///
    /// - Old sides of staged renames are skipped (the rename carries them)
    /// - Missing paths that are tracked are staged as deletions
    /// - Directories expand to their untracked and modified files
    ///
    /// After `git add`, every expected path must be staged or be the source
    /// of a rename whose destination is staged.
    ///
    /// # Errors
    ///
    /// - [`GitError::Precondition`] for empty input
    /// - [`GitError::MissingFile`] for paths neither on disk nor tracked
    /// - [`GitError::NoStageablePaths`] when everything expanded to nothing
    /// - [`GitError::Ignored`] for paths excluded by ignore rules
    /// - [`GitError::NotStaged`] when the post-condition fails
    pub fn stage(&self, files: &[String]) -> Result<(), GitError> {
        if files.is_empty() {
            return Err(GitError::Precondition("no files to stage".to_string()));
        }

        let renames = self.staged_renames()?;
        let mut to_add: Vec<String> = Vec::new();
        let mut expected: Vec<String> = Vec::new();
        let mut rename_sources: Vec<(String, String)> = Vec::new();

        for file in files {
            let path = file.trim_end_matches('/');
            if path.is_empty() {
                continue;
            }

            if let Some((old, new)) = renames.iter().find(|(old, _)| old == path) {
                rename_sources.push((old.clone(), new.clone()));
                continue;
            }

            let full = self.work_dir.join(path);
            match fs::symlink_metadata(&full) {
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    if self.index_contains(path)? {
                        to_add.push(path.to_string());
                        expected.push(path.to_string());
                    } else if self.head_contains(path) {
                        // Deletion is already staged
                        expected.push(path.to_string());
                    } else {
                        return Err(GitError::MissingFile {
                            path: path.to_string(),
                        });
                    }
                }
                Err(source) => return Err(GitError::Io { path: full, source }),
                Ok(meta) if meta.is_dir() => {
                    let expanded = self.pending_files_in_dir(path)?;
                    expected.extend(expanded.iter().cloned());
                    to_add.extend(expanded);
                }
                Ok(_) => {
                    to_add.push(path.to_string());
                    expected.push(path.to_string());
                }
            }
        }

        let mut seen = HashSet::new();
        to_add.retain(|p| seen.insert(p.clone()));

        if to_add.is_empty() {
            if rename_sources.is_empty() && expected.is_empty() {
                return Err(GitError::NoStageablePaths);
            }
            return self.verify_staged(&expected, &rename_sources);
        }

        self.invalidate();
        let mut args = vec!["add", "--"];
        args.extend(to_add.iter().map(String::as_str));
        let out = self.run(&args)?;
        if !out.success() {
            if let Some(path) = to_add.iter().find(|p| self.is_ignored(p)) {
                return Err(GitError::Ignored { path: path.clone() });
            }
            return Err(Self::command_error(&args, &out));
        }

        self.verify_staged(&expected, &rename_sources)
    }

    /// Post-condition for [`Git::stage`].
    fn verify_staged(
        &self,
        expected: &[String],
        rename_sources: &[(String, String)],
    ) -> Result<(), GitError> {
        let staged: HashSet<String> = self.staged_files()?.into_iter().collect();

        for (old, new) in rename_sources {
            if !staged.contains(new) {
                return Err(GitError::NotStaged {
                    path: old.clone(),
                    diagnostic: format!("rename destination '{}' is not staged", new),
                });
            }
        }

        if expected.iter().all(|p| staged.contains(p)) {
            return Ok(());
        }

        let renames = self.staged_renames()?;
        for path in expected {
            if staged.contains(path) {
                continue;
            }
            let auto_renamed = renames
                .iter()
                .any(|(old, new)| old == path && staged.contains(new));
            if auto_renamed {
                continue;
            }
            if self.is_ignored(path) {
                return Err(GitError::Ignored { path: path.clone() });
            }
            return Err(GitError::NotStaged {
                path: path.clone(),
                diagnostic: self.diagnose(path, &renames),
            });
        }
        Ok(())
    }

    /// Describe why a path might not be staged.
    fn diagnose(&self, path: &str, renames: &[(String, String)]) -> String {
        let exists = self.work_dir.join(path).exists();
        let tracked = self.index_contains(path).unwrap_or(false);
        let porcelain = self
            .run(&["status", "--porcelain", "--", path])
            .map(|o| o.stdout.trim().to_string())
            .unwrap_or_default();
        let rename = renames
            .iter()
            .find(|(old, new)| old == path || new == path)
            .map(|(old, new)| format!("{} -> {}", old, new))
            .unwrap_or_else(|| "none".to_string());

        format!(
            "exists: {}, tracked: {}, status: {}, rename: {}",
            exists,
            tracked,
            if porcelain.is_empty() { "clean" } else { porcelain.as_str() },
            rename
        )
    }

    fn unstage_result(args: &[&str], out: GitOutput) -> Result<(), GitError> {
        let combined = out.combined();
        if out.success() || BENIGN_UNSTAGE_MESSAGES.iter().any(|m| combined.contains(m)) {
            Ok(())
        } else {
            Err(Self::command_error(args, &out))
        }
    }

    /// Reset the index to HEAD (or empty it on an unborn branch).
    pub fn unstage_all(&self) -> Result<(), GitError> {
        self.invalidate();
        let args: &[&str] = if self.has_head() {
            &["reset", "-q", "HEAD"]
        } else {
            &["rm", "--cached", "-r", "-q", "--ignore-unmatch", "."]
        };
        let out = self.run(args)?;
        Self::unstage_result(args, out)
    }

    /// Unstage specific paths.
    pub fn unstage(&self, files: &[String]) -> Result<(), GitError> {
        if files.is_empty() {
            return Err(GitError::Precondition("no files to unstage".to_string()));
        }
        self.invalidate();
        let mut args: Vec<&str> = if self.has_head() {
            vec!["reset", "-q", "HEAD", "--"]
        } else {
            vec!["rm", "--cached", "-r", "-q", "--ignore-unmatch", "--"]
        };
        args.extend(files.iter().map(String::as_str));
        let out = self.run(&args)?;
        Self::unstage_result(&args, out)
    }

    /// Stage every change, including untracked files.
    pub fn stage_all(&self) -> Result<(), GitError> {
        self.invalidate();
        self.run_checked(&["add", "-A"]).map(|_| ())
    }

    /// Commit the index and return the new commit's short id.
    ///
    /// # Errors
    ///
    /// - [`GitError::Precondition`] if the message is empty or too long
    /// - [`GitError::NothingStaged`] if the index matches HEAD
    pub fn commit(&self, message: &str) -> Result<String, GitError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(GitError::Precondition(
                "commit message cannot be empty".to_string(),
            ));
        }
        if message.chars().count() > MAX_COMMIT_MESSAGE_LENGTH {
            return Err(GitError::Precondition(format!(
                "commit message exceeds {} characters",
                MAX_COMMIT_MESSAGE_LENGTH
            )));
        }
        if !self.has_staged_changes()? {
            return Err(GitError::NothingStaged);
        }

        self.invalidate();
        self.run_checked(&["commit", "-q", "-m", message])?;
        self.run_checked(&["rev-parse", "--short", "HEAD"])
            .map(|out| out.trim().to_string())
    }

    /// Undo the last `count` commits, leaving their changes unstaged.
    ///
    /// Pushed state is probed on `HEAD~(count-1)`, the oldest commit being
    /// undone: if it is on a remote, so is everything after it.
    ///
    /// # Errors
    ///
    /// - [`GitError::Precondition`] if `count` is zero
    /// - [`GitError::InsufficientDepth`] if `HEAD~count` does not exist
    /// - [`GitError::Pushed`] if the commits are on a remote and `force` is false
    pub fn reverse(&self, count: usize, force: bool) -> Result<(), GitError> {
        if count == 0 {
            return Err(GitError::Precondition(
                "count must be at least 1".to_string(),
            ));
        }
        self.has_commit_depth(count)?;

        if !force {
            let probe = format!("HEAD~{}", count - 1);
            if self.is_ref_pushed(&probe) {
                return Err(GitError::Pushed { count });
            }
        }

        self.invalidate();
        let target = format!("HEAD~{}", count);
        self.run_checked(&["reset", "--soft", &target])?;
        self.unstage_all()
    }

    // =========================================================================
    // Rebase
    // =========================================================================

    /// Run `git rebase -i` onto `base` (or `--root` when `None`).
    ///
    /// Returns the captured output; the caller decides how to treat failure.
    pub fn rebase_interactive(
        &self,
        base: Option<&str>,
        env: &[(&str, String)],
    ) -> Result<GitOutput, GitError> {
        self.invalidate();
        let target = base.unwrap_or("--root");
        self.run_with_env(&["rebase", "-i", target], env)
    }

    /// Whether an interactive rebase is stopped mid-way.
    pub fn is_rebase_in_progress(&self) -> bool {
        match self.git_dir() {
            Ok(dir) => dir.join("rebase-merge").exists() || dir.join("rebase-apply").exists(),
            Err(_) => false,
        }
    }

    /// Abort a stopped rebase, restoring the original branch.
    pub fn abort_rebase(&self) -> Result<(), GitError> {
        self.invalidate();
        self.run_checked(&["rebase", "--abort"]).map(|_| ())
    }
}
