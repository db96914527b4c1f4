//! planner::reply
//!
//! Parsing of provider replies.
//!
//! Tolerates one leading ```` ```json ```` or ```` ``` ```` fence and one
//! trailing ```` ``` ```` fence with surrounding whitespace. Anything else
//! must be the bare JSON object; prose around it is an error.

use thiserror::Error;

use crate::core::types::CommitPlan;

/// Errors from reply parsing.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("reply is empty")]
    Empty,

    #[error("reply is not a valid commit plan: {0}")]
    Json(#[from] serde_json::Error),
}

/// Remove a single surrounding code fence, if present.
pub fn strip_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Parse a `{"commits": [...]}` reply.
pub fn parse_plan(text: &str) -> Result<CommitPlan, ReplyError> {
    let body = strip_fences(text);
    if body.is_empty() {
        return Err(ReplyError::Empty);
    }
    let mut plan: CommitPlan = serde_json::from_str(body)?;
    for commit in &mut plan.commits {
        if commit.scope.as_deref().is_some_and(|s| s.trim().is_empty()) {
            commit.scope = None;
        }
    }
    Ok(plan)
}

/// Parse a single commit-message reply: the first non-empty line,
/// without surrounding quotes or backticks.
pub fn parse_message(text: &str) -> Result<String, ReplyError> {
    strip_fences(text)
        .lines()
        .map(|line| line.trim().trim_matches(|c| c == '"' || c == '`').trim())
        .find(|line| !line.is_empty())
        .map(String::from)
        .ok_or(ReplyError::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{"commits":[{"type":"feat","scope":"auth","message":"add logout","files":["src/auth.rs"],"reasoning":"new feature"}]}"#;

    mod fences {
        use super::*;

        #[test]
        fn json_fence() {
            let text = format!("```json\n{}\n```", PLAN);
            assert_eq!(strip_fences(&text), PLAN);
        }

        #[test]
        fn bare_fence_with_whitespace() {
            let text = format!("  \n```\n{}\n```  \n", PLAN);
            assert_eq!(strip_fences(&text), PLAN);
        }

        #[test]
        fn unfenced_is_untouched() {
            assert_eq!(strip_fences(PLAN), PLAN);
        }
    }

    #[test]
    fn parses_plan() {
        let plan = parse_plan(PLAN).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.commits[0].full_message(), "feat(auth): add logout");
        assert_eq!(plan.commits[0].reasoning, "new feature");
    }

    #[test]
    fn null_and_empty_scope_become_none() {
        let text = r#"{"commits":[
            {"type":"docs","scope":null,"message":"a","files":["a.md"]},
            {"type":"docs","scope":" ","message":"b","files":["b.md"]}
        ]}"#;
        let plan = parse_plan(text).unwrap();
        assert!(plan.commits.iter().all(|c| c.scope.is_none()));
    }

    #[test]
    fn prose_around_json_is_rejected() {
        let text = format!("Here is the plan:\n{}", PLAN);
        assert!(matches!(parse_plan(&text), Err(ReplyError::Json(_))));
    }

    #[test]
    fn empty_reply_is_rejected() {
        assert!(matches!(parse_plan("```json\n```"), Err(ReplyError::Empty)));
    }

    #[test]
    fn message_takes_first_line() {
        let text = "```\n\"fix(api): handle timeouts\"\n\nlonger body\n```";
        assert_eq!(parse_message(text).unwrap(), "fix(api): handle timeouts");
    }
}
