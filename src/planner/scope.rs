//! planner::scope
//!
//! Scope assignment by longest path-prefix match.

use crate::core::config::{RepoConfig, ScopeRule};
use crate::core::types::FileChange;

/// Normalize a configured prefix: no leading `./`, no trailing `/`.
fn normalize_prefix(prefix: &str) -> &str {
    prefix.trim_start_matches("./").trim_end_matches('/')
}

/// Whether `prefix` covers `path` on a component boundary.
fn covers(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    path == prefix
        || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'/'))
}

/// Scope for `path`: the most specific matching rule wins, ties go to
/// the earlier rule, and `default_scope` applies when nothing matches.
///
/// ```
/// use commitweave::core::config::ScopeRule;
/// use commitweave::planner::scope::assign_scope;
///
/// let rules = vec![
///     ScopeRule { path: "src".into(), scope: "core".into() },
///     ScopeRule { path: "src/auth".into(), scope: "auth".into() },
/// ];
/// assert_eq!(assign_scope("src/auth/login.rs", &rules, None).as_deref(), Some("auth"));
/// assert_eq!(assign_scope("src/lib.rs", &rules, None).as_deref(), Some("core"));
/// assert_eq!(assign_scope("README.md", &rules, Some("docs")).as_deref(), Some("docs"));
/// ```
pub fn assign_scope(path: &str, rules: &[ScopeRule], default_scope: Option<&str>) -> Option<String> {
    let mut best: Option<(&ScopeRule, usize)> = None;
    for rule in rules {
        let prefix = normalize_prefix(&rule.path);
        if !covers(prefix, path) {
            continue;
        }
        match best {
            Some((_, len)) if len >= prefix.len() => {}
            _ => best = Some((rule, prefix.len())),
        }
    }

    best.map(|(rule, _)| rule.scope.clone())
        .or_else(|| default_scope.map(String::from))
}

/// Fill in `scope` on every change from the repository's rules.
pub fn assign_scopes(files: &mut [FileChange], config: &RepoConfig) {
    for file in files {
        file.scope = assign_scope(&file.path, &config.scopes, config.default_scope.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(path: &str, scope: &str) -> ScopeRule {
        ScopeRule {
            path: path.to_string(),
            scope: scope.to_string(),
        }
    }

    #[test]
    fn longest_prefix_wins_regardless_of_order() {
        let rules = vec![rule("src/api/v2", "v2"), rule("src", "core"), rule("src/api", "api")];
        assert_eq!(assign_scope("src/api/v2/users.rs", &rules, None).as_deref(), Some("v2"));
        assert_eq!(assign_scope("src/api/health.rs", &rules, None).as_deref(), Some("api"));
    }

    #[test]
    fn ties_go_to_first_rule() {
        let rules = vec![rule("web/", "frontend"), rule("web", "ui")];
        assert_eq!(assign_scope("web/index.ts", &rules, None).as_deref(), Some("frontend"));
    }

    #[test]
    fn prefix_must_end_on_component_boundary() {
        let rules = vec![rule("src/auth", "auth")];
        assert_eq!(assign_scope("src/authz/policy.rs", &rules, None), None);
        assert_eq!(assign_scope("src/auth", &rules, None).as_deref(), Some("auth"));
    }

    #[test]
    fn dot_slash_prefix_is_normalized() {
        let rules = vec![rule("./docs/", "docs")];
        assert_eq!(assign_scope("docs/guide.md", &rules, None).as_deref(), Some("docs"));
    }

    #[test]
    fn default_scope_applies_when_nothing_matches() {
        let rules = vec![rule("src", "core")];
        assert_eq!(assign_scope("Cargo.toml", &rules, Some("build")).as_deref(), Some("build"));
        assert_eq!(assign_scope("Cargo.toml", &rules, None), None);
    }

    #[test]
    fn assign_scopes_updates_changes() {
        let config = RepoConfig {
            scopes: vec![rule("src", "core")],
            ..Default::default()
        };
        let mut files = vec![
            FileChange::new("src/lib.rs", Default::default()),
            FileChange::new("README.md", Default::default()),
        ];
        assign_scopes(&mut files, &config);
        assert_eq!(files[0].scope.as_deref(), Some("core"));
        assert_eq!(files[1].scope, None);
    }
}
