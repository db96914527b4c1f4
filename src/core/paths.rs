//! core::paths
//!
//! Path normalization and safety checks for repo-relative paths.
//!
//! Paths proposed by the planner come from an untrusted source. Before any
//! of them reaches `git add`, they must be relative and must not climb out
//! of the repository once normalized.
//!
//! # Example
//!
//! ```
//! use commitweave::core::paths::{clean, is_path_safe};
//!
//! assert_eq!(clean("src/./a/../b.rs"), "src/b.rs");
//! assert!(is_path_safe("src/b.rs"));
//! assert!(!is_path_safe("../etc/passwd"));
//! assert!(!is_path_safe("/etc/passwd"));
//! ```

/// Lexically normalize a forward-slash path.
///
/// Removes `.` components and empty segments, and resolves `..` against
/// preceding components. Leading `..` components that cannot be resolved
/// are kept. An empty result becomes `.`.
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Whether a path is absolute on any platform we care about.
fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }
    // Windows drive prefix, e.g. `C:\` or `C:/`
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Whether a planner-supplied path is safe to hand to git.
///
/// A safe path is non-empty, relative, is not `..`, and has no `..`
/// component after [`clean`].
pub fn is_path_safe(path: &str) -> bool {
    if path.is_empty() || is_absolute(path) || path == ".." {
        return false;
    }
    let normalized = path.replace('\\', "/");
    !clean(&normalized).split('/').any(|c| c == "..")
}

/// Final component of a forward-slash path.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
