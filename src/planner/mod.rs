//! planner
//!
//! Turns the working tree into a validated commit plan.
//!
//! # Pipeline
//!
//! 1. Collect status (ignore-filtered), numstat, a bounded diff, and recent
//!    subjects through the VCS Port
//! 2. Assign scopes by longest path prefix
//! 3. Build the prompt and call the [`Provider`]
//! 4. Parse the reply
//! 5. Repair (truncate, merge overlaps) and validate
//!
//! The planner never stages or commits anything. A failed validation is
//! returned in the [`PlanOutcome`] for the caller to surface.
//!
//! # Modules
//!
//! - [`scope`]: scope assignment
//! - [`prompt`]: system and user prompt synthesis
//! - [`reply`]: fence stripping and JSON parsing
//! - [`truncate`]: diff budget enforcement
//! - [`validate`]: the validator-repairer

pub mod prompt;
pub mod reply;
pub mod scope;
pub mod truncate;
pub mod validate;

use std::collections::HashSet;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::core::config::{Config, RepoConfig};
use crate::core::types::{CommitPlan, CommitRules, FileChange};
use crate::git::{Git, GitError};
use crate::provider::{AnalysisRequest, Provider, ProviderError};
use crate::ui::output::{self, Verbosity};

pub use validate::{RepairReport, ValidationContext, ValidationIssue, ValidationVerdict};

/// Errors from planning.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Nothing to plan.
    #[error("no changes to commit")]
    NoChanges,

    /// `message` was requested with an empty index.
    #[error("no staged changes; stage something first")]
    NothingStaged,

    #[error("provider returned an unusable message: {0}")]
    Reply(#[from] reply::ReplyError),
}

/// Knobs for one planning run.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub rules: CommitRules,
    /// Character budget for the diff in the prompt
    pub max_diff_chars: usize,
    /// Number of recent subjects to send as style hints
    pub recent_subjects: usize,
    /// Ask for (and enforce) a single commit
    pub single_commit: bool,
}

impl PlanOptions {
    /// Options from the effective configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            rules: config.commit_rules(),
            max_diff_chars: config.max_diff_chars(),
            recent_subjects: config.recent_subjects(),
            single_commit: false,
        }
    }
}

/// Result of a planning run.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// The repaired plan
    pub plan: CommitPlan,
    pub verdict: ValidationVerdict,
    pub repairs: RepairReport,
    /// Whether the prompt diff was truncated
    pub diff_truncated: bool,
}

/// The planner.
pub struct Planner<'a> {
    git: &'a Git,
    provider: &'a dyn Provider,
    repo: &'a RepoConfig,
    verbosity: Verbosity,
}

impl<'a> Planner<'a> {
    pub fn new(git: &'a Git, provider: &'a dyn Provider, repo: &'a RepoConfig) -> Self {
        Self {
            git,
            provider,
            repo,
            verbosity: Verbosity::Normal,
        }
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Gather changed files with status, summary, and scope.
    fn collect_files(&self) -> Result<(Vec<FileChange>, HashSet<String>), PlanError> {
        let status = self.git.status()?;
        if !status.has_changes() {
            return Err(PlanError::NoChanges);
        }

        let numstat = self.git.diff_numstat(false)?;
        let mut files: Vec<FileChange> = status
            .all_files()
            .into_iter()
            .map(|path| {
                let mut change = numstat
                    .get(&path)
                    .cloned()
                    .unwrap_or_else(|| FileChange::new(path.clone(), Default::default()));
                if let Some(category) = status.status_of(&path) {
                    change.status = category;
                }
                if change.summary.is_empty() {
                    change.summary = "new file".to_string();
                }
                change.path = path;
                change
            })
            .collect();
        scope::assign_scopes(&mut files, self.repo);

        let known = files
            .iter()
            .map(|f| f.path.clone())
            .chain(status.staged.iter().cloned())
            .collect();
        Ok((files, known))
    }

    /// Produce a repaired plan and its verdict.
    pub async fn plan(
        &self,
        cancel: &CancellationToken,
        options: &PlanOptions,
    ) -> Result<PlanOutcome, PlanError> {
        let (files, known) = self.collect_files()?;

        let diff = self.git.diff(false, &[])?;
        let bounded = truncate::truncate_diff(&diff, options.max_diff_chars);
        let diff_truncated = bounded.len() != diff.len();
        let recent_subjects = self.git.recent_commit_subjects(options.recent_subjects)?;

        let request = AnalysisRequest {
            files,
            diff: bounded,
            recent_subjects,
            rules: options.rules.clone(),
            has_scopes: self.repo.has_scopes(),
            single_commit: options.single_commit,
        };
        output::debug(
            format!(
                "planning {} file(s), diff {} chars{}",
                request.files.len(),
                request.diff.chars().count(),
                if diff_truncated { " (truncated)" } else { "" }
            ),
            self.verbosity,
        );

        let proposed = self.provider.analyze(cancel, &request).await?;
        output::debug(
            format!("{} proposed {} commit(s)", self.provider.name(), proposed.len()),
            self.verbosity,
        );

        let (mut plan, mut repairs) =
            validate::repair(proposed, options.rules.max_message_length);
        if options.single_commit {
            let (single, collapsed) = validate::collapse_to_single(plan);
            plan = single;
            repairs.merged.extend(collapsed);
        }
        if !repairs.is_empty() {
            output::debug(format!("repairs: {:?}", repairs), self.verbosity);
        }

        let verdict = validate::validate(
            &plan,
            &ValidationContext {
                root: self.git.work_dir().to_path_buf(),
                repo: self.repo.clone(),
                max_message_length: options.rules.max_message_length,
                known,
            },
        );

        Ok(PlanOutcome {
            plan,
            verdict,
            repairs,
            diff_truncated,
        })
    }

    /// Generate one commit subject for the staged changes.
    pub async fn message(
        &self,
        cancel: &CancellationToken,
        options: &PlanOptions,
    ) -> Result<String, PlanError> {
        if !self.git.has_staged_changes()? {
            return Err(PlanError::NothingStaged);
        }
        let diff = self.git.diff(true, &[])?;
        let bounded = truncate::truncate_diff(&diff, options.max_diff_chars);
        let recent = self.git.recent_commit_subjects(options.recent_subjects)?;

        let system = prompt::message_system_prompt(&options.rules);
        let user = prompt::message_user_prompt(&bounded, &recent);
        let text = self.provider.analyze_diff(cancel, &system, &user).await?;
        Ok(reply::parse_message(&text)?)
    }
}
