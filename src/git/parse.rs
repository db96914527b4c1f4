//! git::parse
//!
//! Parsers for git's textual output.
//!
//! Everything in here is pure: it takes captured stdout and returns typed
//! values. The subprocess plumbing lives in [`super::interface`].

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::core::types::{FileChange, FileStatus, WorkingTreeStatus};

/// Field separator used in `--format` strings (ASCII unit separator).
pub const FIELD_SEP: char = '\x1f';

/// `--format` string for commit log records consumed by [`parse_log_records`].
pub const LOG_FORMAT: &str = "--format=%H%x1f%h%x1f%an%x1f%at%x1f%s";

/// One line of `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PorcelainEntry {
    /// Index-side status code (column 0)
    pub index: char,
    /// Worktree-side status code (column 1)
    pub worktree: char,
    /// Path; for renames, the new path
    pub path: String,
    /// Original path for renames and copies
    pub orig_path: Option<String>,
}

impl PorcelainEntry {
    pub fn is_untracked(&self) -> bool {
        self.index == '?' && self.worktree == '?'
    }

    /// Whether the index differs from HEAD for this path.
    pub fn is_staged(&self) -> bool {
        !matches!(self.index, ' ' | '?' | '!')
    }

    /// Map the two status columns to a single change category.
    pub fn category(&self) -> FileStatus {
        if self.is_untracked() {
            FileStatus::Untracked
        } else if self.index == 'R' || self.worktree == 'R' {
            FileStatus::Renamed
        } else if self.index == 'A' {
            FileStatus::Added
        } else if self.index == 'D' || self.worktree == 'D' {
            FileStatus::Deleted
        } else {
            FileStatus::Modified
        }
    }
}

/// Undo git's C-style quoting of unusual paths (`"a b\tc"`).
pub fn unquote(path: &str) -> String {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
    else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('"') => bytes.push(b'"'),
            Some('\\') => bytes.push(b'\\'),
            Some(d) if d.is_digit(8) => {
                // Octal escape for raw bytes (non-ASCII UTF-8)
                let mut value = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(v) => {
                            value = value * 8 + v;
                            chars.next();
                        }
                        None => break,
                    }
                }
                bytes.push(value as u8);
            }
            Some(other) => {
                bytes.push(b'\\');
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Parse `git status --porcelain` output.
///
/// Columns 0-1 are the index/worktree codes, the path starts at column 3.
/// Rename entries (`old -> new`) keep only the new path as `path`.
pub fn parse_porcelain(output: &str) -> Vec<PorcelainEntry> {
    output
        .lines()
        .filter(|line| line.len() > 3)
        .filter_map(|line| {
            let mut chars = line.chars();
            let index = chars.next()?;
            let worktree = chars.next()?;
            let rest = line.get(3..)?;

            let (orig_path, path) = match rest.split_once(" -> ") {
                Some((old, new)) if matches!(index, 'R' | 'C') || worktree == 'R' => {
                    (Some(unquote(old)), unquote(new))
                }
                _ => (None, unquote(rest)),
            };

            Some(PorcelainEntry {
                index,
                worktree,
                path,
                orig_path,
            })
        })
        .collect()
}

/// Group porcelain entries into a [`WorkingTreeStatus`].
pub fn categorize(entries: &[PorcelainEntry]) -> WorkingTreeStatus {
    let mut status = WorkingTreeStatus::default();
    for entry in entries {
        let path = entry.path.clone();
        if entry.is_staged() {
            status.staged.push(path.clone());
        }
        match entry.category() {
            FileStatus::Modified => status.modified.push(path),
            FileStatus::Added => status.added.push(path),
            FileStatus::Deleted => status.deleted.push(path),
            FileStatus::Renamed => status.renamed.push(path),
            FileStatus::Untracked => status.untracked.push(path),
        }
    }
    status
}

/// Parse `git diff --stat` output into `path -> summary`.
///
/// Recognizes lines of the shape `<ws>path<ws>|<ws>count symbols`; the
/// trailing "N files changed" line has no `|` and is skipped.
pub fn parse_stat(output: &str) -> BTreeMap<String, String> {
    let mut stats = BTreeMap::new();
    for line in output.lines() {
        if !line.starts_with(char::is_whitespace) {
            continue;
        }
        let Some((path, summary)) = line.rsplit_once('|') else {
            continue;
        };
        let path = path.trim();
        let summary = summary.trim();
        if path.is_empty() || summary.is_empty() {
            continue;
        }
        stats.insert(resolve_rename_arrow(path), summary.to_string());
    }
    stats
}

/// Parse `git diff --numstat` output into `path -> FileChange`.
///
/// Each line is `added<ws>removed<ws>path`. Binary files report `-`, which
/// maps to the literal `binary`.
pub fn parse_numstat(output: &str) -> BTreeMap<String, FileChange> {
    let mut changes = BTreeMap::new();
    for line in output.lines() {
        let mut parts = line.split_whitespace();
        let (Some(added), Some(removed)) = (parts.next(), parts.next()) else {
            continue;
        };
        let path = parts.collect::<Vec<_>>().join(" ");
        if path.is_empty() {
            continue;
        }
        let path = resolve_rename_arrow(&path);
        let status = if path_was_renamed(line) {
            FileStatus::Renamed
        } else {
            FileStatus::Modified
        };
        changes.insert(
            path.clone(),
            FileChange {
                path,
                status,
                scope: None,
                summary: FileChange::summary_from_counts(added, removed),
            },
        );
    }
    changes
}

fn path_was_renamed(line: &str) -> bool {
    line.contains(" => ")
}

/// Resolve git's rename notation to the destination path.
///
/// Handles both `old => new` and `dir/{old => new}/file`.
pub fn resolve_rename_arrow(path: &str) -> String {
    if let (Some(open), Some(close)) = (path.find('{'), path.rfind('}')) {
        if open < close {
            let inner = &path[open + 1..close];
            if let Some((_, new)) = inner.split_once(" => ") {
                let joined = format!("{}{}{}", &path[..open], new, &path[close + 1..]);
                return joined.replace("//", "/");
            }
        }
    }
    match path.split_once(" => ") {
        Some((_, new)) => unquote(new.trim()),
        None => unquote(path),
    }
}

/// Parse `git diff --name-status -M` output into `(old, new)` rename pairs.
pub fn parse_renames(output: &str) -> Vec<(String, String)> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let code = fields.next()?;
            if !code.starts_with('R') {
                return None;
            }
            let old = fields.next()?;
            let new = fields.next()?;
            Some((unquote(old), unquote(new)))
        })
        .collect()
}

/// Parse newline-separated path output (`--name-only`, `ls-files`).
pub fn parse_paths(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(unquote)
        .collect()
}

/// A commit record produced with [`LOG_FORMAT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub id: String,
    pub short_id: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub subject: String,
}

/// Parse log records separated by [`FIELD_SEP`], one per line.
pub fn parse_log_records(output: &str) -> Vec<LogRecord> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(5, FIELD_SEP);
            let id = fields.next()?.trim().to_string();
            let short_id = fields.next()?.to_string();
            let author = fields.next()?.to_string();
            let seconds: i64 = fields.next()?.trim().parse().ok()?;
            let subject = fields.next().unwrap_or_default().to_string();
            if id.is_empty() {
                return None;
            }
            let timestamp = Utc.timestamp_opt(seconds, 0).single()?;
            Some(LogRecord {
                id,
                short_id,
                author,
                timestamp,
                subject,
            })
        })
        .collect()
}
