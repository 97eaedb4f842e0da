//! Activity code resolution.
//!
//! Comments in the export carry a short activity code somewhere in the text
//! (e.g. "003 follow-up"). The resolver maps such a comment to the canonical
//! activity label from the configured code table. Codes on the raw-keep list
//! keep the operator's original text instead of the label.

use std::collections::HashSet;

/// Placeholder written when an entry carries no comment at all
pub const MISSING_COMMENT: &str = "MISSING COMMENT";

/// Width of an activity code, e.g. "005"
const CODE_WIDTH: usize = 3;

/// The closed activity code table. Scan order is declaration order: the
/// first code found as a substring of a comment decides the match, even if
/// a later code would match more of the text.
#[derive(Clone, Debug, Default)]
pub struct CodeTable {
    entries: Vec<(String, String)>,
    keep_raw: HashSet<String>,
}

impl CodeTable {
    pub fn new(
        entries: impl IntoIterator<Item = (String, String)>,
        keep_raw: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            keep_raw: keep_raw.into_iter().collect(),
        }
    }

    /// Ordered (code, label) pairs
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Does this code keep the operator's raw comment text?
    pub fn keeps_raw(&self, code: &str) -> bool {
        self.keep_raw.contains(code)
    }
}

/// Resolve a raw comment into an activity label.
///
/// - Missing comment → the [`MISSING_COMMENT`] sentinel.
/// - A bare integer like `5` is zero-padded to the code format (`005`)
///   before matching.
/// - The first code (in table order) contained in the comment wins; if it
///   is on the raw-keep list the original comment is returned unchanged,
///   otherwise the code's label.
/// - No match → the original comment unchanged. Never fails.
pub fn resolve(comment: Option<&str>, table: &CodeTable) -> String {
    let Some(raw) = comment else {
        return MISSING_COMMENT.to_string();
    };

    let padded = zero_pad(raw);
    let haystack = padded.as_deref().unwrap_or(raw);

    for (code, label) in table.entries() {
        if haystack.contains(code.as_str()) {
            if table.keeps_raw(code) {
                return raw.to_string();
            }
            return label.clone();
        }
    }
    raw.to_string()
}

/// Zero-pad a bare small integer to the code width ("5" → "005").
/// Returns `None` when the comment is not a short pure-integer value.
fn zero_pad(comment: &str) -> Option<String> {
    let trimmed = comment.trim();
    if trimmed.is_empty() || trimmed.len() > CODE_WIDTH {
        return None;
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("{:0>width$}", trimmed, width = CODE_WIDTH));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> CodeTable {
        CodeTable::new(
            [
                ("000".to_string(), "Interne Abstimmung".to_string()),
                ("003".to_string(), "Planning".to_string()),
                ("005".to_string(), "Review".to_string()),
                ("999".to_string(), "Sonstiges".to_string()),
            ],
            ["005".to_string()],
        )
    }

    #[test]
    fn code_in_comment_returns_label() {
        assert_eq!(resolve(Some("003 follow-up"), &table()), "Planning");
    }

    #[test]
    fn missing_comment_returns_sentinel() {
        assert_eq!(resolve(None, &table()), MISSING_COMMENT);
    }

    #[test]
    fn unmatched_comment_passes_through() {
        assert_eq!(resolve(Some("meeting notes"), &table()), "meeting notes");
    }

    #[test]
    fn keep_raw_code_returns_original_text() {
        let comment = "005: reviewed the deployment checklist";
        assert_eq!(resolve(Some(comment), &table()), comment);
    }

    #[test]
    fn bare_integer_is_zero_padded_before_matching() {
        // "5" → "005", which is on the raw-keep list, so the raw text stays
        assert_eq!(resolve(Some("5"), &table()), "5");
        // "3" → "003" resolves to the label
        assert_eq!(resolve(Some("3"), &table()), "Planning");
    }

    #[test]
    fn first_match_wins_over_later_codes() {
        // Both 000 and 999 appear; table order decides, not specificity.
        assert_eq!(resolve(Some("000 then 999"), &table()), "Interne Abstimmung");
    }

    #[test]
    fn long_numeric_strings_are_not_padded() {
        assert_eq!(resolve(Some("20240304"), &table()), "20240304");
    }
}
