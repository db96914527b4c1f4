//! Shared fixtures for integration tests.
//!
//! Repositories are real git repositories in temporary directories, driven
//! by the `git` binary so the fixtures do not depend on the code under test.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use commitweave::git::Git;

/// Test fixture that creates a real git repository.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// An empty repository with identity configured and no commits.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        run_git(dir.path(), &["init", "-q", "-b", "main"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"]);
        Self { dir }
    }

    /// A repository with an initial commit.
    pub fn new() -> Self {
        let repo = Self::empty();
        repo.commit_file("README.md", "# Test Repo\n", "Initial commit");
        repo
    }

    /// Get the path to the repository.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Open a Git interface to this repository.
    pub fn git(&self) -> Git {
        Git::open(self.path()).expect("failed to open test repo")
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, path: &str, content: &str) {
        let full = self.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).unwrap()
    }

    /// Write, stage, and commit a file.
    pub fn commit_file(&self, path: &str, content: &str, message: &str) {
        self.write(path, content);
        self.git_ok(&["add", "--", path]);
        self.git_ok(&["commit", "-q", "-m", message]);
    }

    /// Run git and return trimmed stdout, panicking on failure.
    pub fn git_ok(&self, args: &[&str]) -> String {
        run_git(self.path(), args)
    }

    /// Commit subjects, newest first.
    pub fn subjects(&self) -> Vec<String> {
        self.git_ok(&["log", "--format=%s"])
            .lines()
            .map(String::from)
            .collect()
    }

    pub fn head(&self) -> String {
        self.git_ok(&["rev-parse", "HEAD"])
    }

    /// Paths staged relative to HEAD.
    pub fn staged(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .git_ok(&["diff", "--cached", "--name-only"])
            .lines()
            .map(String::from)
            .collect();
        paths.sort();
        paths
    }

    /// `git status --porcelain` output.
    pub fn porcelain(&self) -> String {
        self.git_ok(&["status", "--porcelain"])
    }

    /// Add a bare repository as `origin` and push `main` to it.
    pub fn with_pushed_remote(&self) -> TempDir {
        let remote = TempDir::new().expect("failed to create remote dir");
        run_git(remote.path(), &["init", "-q", "--bare"]);
        let url = remote.path().to_string_lossy().to_string();
        self.git_ok(&["remote", "add", "origin", &url]);
        self.git_ok(&["push", "-q", "origin", "main"]);
        remote
    }
}

/// Run a git command in the given directory and return trimmed stdout.
pub fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_EDITOR", "true")
        .output()
        .expect("git command failed to execute");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
