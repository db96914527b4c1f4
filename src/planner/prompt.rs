//! planner::prompt
//!
//! Prompt synthesis for the provider.
//!
//! The system prompt is stable and versioned; the user prompt carries the
//! repository state (file list, bounded diff, recent subjects, rules).

use std::fmt::Write;

use crate::core::types::{CommitRules, FileChange};
use crate::provider::AnalysisRequest;

/// Bumped whenever the wording of the system prompt changes.
pub const PROMPT_VERSION: u32 = 3;

/// Preferred type and the substitutes to use, in order, when the
/// repository disallows it.
const TYPE_SUBSTITUTES: &[(&str, &[&str])] = &[
    ("feat", &["fix", "refactor", "chore"]),
    ("fix", &["refactor", "chore"]),
    ("docs", &["chore"]),
    ("style", &["refactor", "chore"]),
    ("refactor", &["chore"]),
    ("perf", &["refactor", "fix"]),
    ("test", &["chore", "refactor"]),
    ("build", &["chore", "ci"]),
    ("ci", &["build", "chore"]),
    ("chore", &["refactor", "build"]),
    ("revert", &["fix", "chore"]),
];

const EXAMPLE_REPLY: &str = r#"{
  "commits": [
    {
      "type": "feat",
      "scope": "auth",
      "message": "add logout endpoint",
      "files": ["src/auth/logout.rs", "src/auth/mod.rs"],
      "reasoning": "New user-facing capability in the auth module"
    },
    {
      "type": "docs",
      "scope": null,
      "message": "document logout flow",
      "files": ["docs/auth.md"],
      "reasoning": "Documentation only"
    }
  ]
}"#;

/// `instead of X, use Y` lines for every disallowed preferred type.
fn substitution_table(rules: &CommitRules) -> Vec<String> {
    TYPE_SUBSTITUTES
        .iter()
        .filter(|(preferred, _)| !rules.allows(preferred))
        .filter_map(|(preferred, subs)| {
            let sub = subs
                .iter()
                .copied()
                .find(|s| rules.allows(s))
                .or_else(|| rules.allowed_types.first().map(String::as_str))?;
            Some(format!("- instead of \"{}\", use \"{}\"", preferred, sub))
        })
        .collect()
}

/// The planning system prompt.
pub fn system_prompt(rules: &CommitRules) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "You are a release engineer splitting pending changes into conventional commits (prompt v{}).",
        PROMPT_VERSION
    );
    out.push_str(
        "\nTask: partition the changed files into a small number of focused, logically \
         coherent commits and write a conventional commit message for each.\n",
    );
    out.push_str(
        "\nType selection:\n\
         - feat: new user-facing behavior\n\
         - fix: corrects wrong behavior\n\
         - refactor: restructures code without changing behavior\n\
         - test: adds or changes tests only\n\
         - docs, style, perf, build, ci, chore, revert: as their names say\n\
         - only use types from the allowed list in the rules\n",
    );

    let table = substitution_table(rules);
    if !table.is_empty() {
        out.push_str("\nSome types are not allowed in this repository:\n");
        for line in table {
            out.push_str(&line);
            out.push('\n');
        }
    }

    out.push_str(
        "\nGrouping:\n\
         - every changed file appears in exactly one commit\n\
         - a file never appears in two commits\n\
         - keep tests with the code they exercise unless the rules say otherwise\n\
         - never invent file paths; use the paths exactly as listed\n",
    );
    out.push_str(
        "\nScope:\n\
         - when scopes are enabled, use the scope shown next to the files\n\
         - when scopes are disabled, set scope to null\n",
    );
    out.push_str(
        "\nMessage format:\n\
         - lowercase, imperative mood, no trailing period\n\
         - do not repeat the type or scope in the message\n\
         - respect the maximum message length\n",
    );
    out.push_str("\nReply with JSON only, in exactly this shape:\n");
    out.push_str(EXAMPLE_REPLY);
    out.push('\n');
    out
}

fn format_file(index: usize, file: &FileChange) -> String {
    let mut line = format!("{}. {} [{}]", index + 1, file.path, file.status);
    if !file.summary.is_empty() {
        line.push(' ');
        line.push_str(&file.summary);
    }
    if let Some(scope) = &file.scope {
        line.push_str(" → ");
        line.push_str(scope);
    }
    line
}

fn rules_block(request: &AnalysisRequest) -> String {
    let rules = &request.rules;
    let mut out = String::from("Rules:\n");
    let _ = writeln!(out, "- allowed types: {}", rules.allowed_types.join("|"));
    let _ = writeln!(out, "- max message length: {}", rules.max_message_length);
    let _ = writeln!(out, "- hasScopes: {}", request.has_scopes);
    if !rules.behavioral_test.trim().is_empty() {
        let _ = writeln!(out, "- behavioral tests: {}", rules.behavioral_test.trim());
    }
    if request.single_commit {
        out.push_str("- produce exactly ONE commit containing every file\n");
    }
    out
}

/// The planning user prompt.
pub fn user_prompt(request: &AnalysisRequest) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Changed files ({}):", request.files.len());
    for (i, file) in request.files.iter().enumerate() {
        out.push_str(&format_file(i, file));
        out.push('\n');
    }

    out.push_str("\nDiff:\n```diff\n");
    out.push_str(request.diff.trim_end());
    out.push_str("\n```\n");

    if !request.recent_subjects.is_empty() {
        out.push_str("\nRecent commit subjects (match their style):\n");
        for subject in &request.recent_subjects {
            let _ = writeln!(out, "- {}", subject);
        }
    }

    out.push('\n');
    out.push_str(&rules_block(request));
    out
}

/// System prompt for generating a single message for staged changes.
pub fn message_system_prompt(rules: &CommitRules) -> String {
    let mut out = String::from(
        "You write conventional commit subject lines for staged changes.\n\
         Reply with exactly one line in the form `type(scope): message` or `type: message`.\n\
         The message is lowercase, imperative, and has no trailing period.\n",
    );
    let _ = writeln!(out, "Allowed types: {}", rules.allowed_types.join("|"));
    let _ = writeln!(
        out,
        "The part after the colon must be at most {} characters.",
        rules.max_message_length
    );
    out
}

/// User prompt for generating a single message.
pub fn message_user_prompt(diff: &str, recent_subjects: &[String]) -> String {
    let mut out = String::from("Staged diff:\n```diff\n");
    out.push_str(diff.trim_end());
    out.push_str("\n```\n");
    if !recent_subjects.is_empty() {
        out.push_str("\nRecent commit subjects (match their style):\n");
        for subject in recent_subjects {
            let _ = writeln!(out, "- {}", subject);
        }
    }
    out
}
