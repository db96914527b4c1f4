//! planner::truncate
//!
//! Keeps the diff sent to the provider within a character budget.

/// Appended to every truncated diff.
pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Truncate `diff` to `max_chars` characters.
///
/// Within budget the input is returned unchanged. Otherwise the text is cut
/// at the budget, backed up to the last newline when that newline lies in
/// the latter half of the kept text, and [`TRUNCATION_MARKER`] is appended.
///
/// ```
/// use commitweave::planner::truncate::truncate_diff;
///
/// assert_eq!(truncate_diff("short", 100), "short");
/// assert_eq!(truncate_diff("line one\nline two", 12), "line one\n... (truncated)");
/// ```
pub fn truncate_diff(diff: &str, max_chars: usize) -> String {
    let cut = match diff.char_indices().nth(max_chars) {
        Some((idx, _)) => idx,
        None => return diff.to_string(),
    };

    let head = &diff[..cut];
    let head = match head.rfind('\n') {
        Some(nl) if head[..nl].chars().count() > max_chars / 2 => &head[..nl],
        _ => head,
    };
    format!("{}{}", head, TRUNCATION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_budget_is_unchanged() {
        assert_eq!(truncate_diff("abc\ndef", 7), "abc\ndef");
        assert_eq!(truncate_diff("", 0), "");
    }

    #[test]
    fn backs_up_to_late_newline() {
        let diff = "aaaa\nbbbb\ncccc";
        assert_eq!(truncate_diff(diff, 12), format!("aaaa\nbbbb{}", TRUNCATION_MARKER));
    }

    #[test]
    fn keeps_hard_cut_when_newline_is_early() {
        let diff = "a\nbbbbbbbbbbbbbbbbbbbb";
        assert_eq!(truncate_diff(diff, 10), format!("a\nbbbbbbbb{}", TRUNCATION_MARKER));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let diff = "ééééé";
        assert_eq!(truncate_diff(diff, 5), diff);
        assert_eq!(truncate_diff(diff, 3), format!("ééé{}", TRUNCATION_MARKER));
    }

    #[test]
    fn newline_position_is_measured_in_characters() {
        // The newline is past half the bytes kept but exactly at half the characters.
        let diff = "éééé\nabcdefgh";
        assert_eq!(truncate_diff(diff, 8), format!("éééé\nabc{}", TRUNCATION_MARKER));
        assert_eq!(truncate_diff(diff, 7), format!("éééé{}", TRUNCATION_MARKER));
    }

    #[test]
    fn idempotent_when_result_fits() {
        let once = truncate_diff(&"x\n".repeat(100), 50);
        let budget = once.chars().count();
        assert_eq!(truncate_diff(&once, budget), once);
    }
}
