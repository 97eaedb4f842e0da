//! Task merging for the per-task reports.
//!
//! Task names in the export are grouped into canonical buckets. Some clients
//! embed a free-text description after the task code ("T100 Implementation
//! Phase"); for those, only the first token is the grouping key. Alias rules
//! then fold related codes into one bucket.

use crate::TimeEntry;
use std::collections::BTreeMap;

/// Result of a task merge: canonical buckets plus the entries that carried
/// no task name at all. The latter are a user-facing decision point, never
/// silently dropped.
#[derive(Clone, Debug, Default)]
pub struct MergeOutcome {
    /// Canonical task name → date-sorted entries
    pub buckets: BTreeMap<String, Vec<TimeEntry>>,
    /// Entries without a task name, in input order
    pub without_task: Vec<TimeEntry>,
}

impl MergeOutcome {
    pub fn total_entries(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Merge entries into aliased task buckets.
///
/// - `use_first_word_only`: derive the key from the first whitespace token
///   of the task name instead of the trimmed full name.
/// - `aliases`: rewrite a derived key to its canonical bucket; unmapped keys
///   pass through unchanged.
///
/// Bucket lists are sorted ascending by entry date; ties keep their input
/// order (stable sort). The merge is associative over grouping order.
pub fn merge_tasks(
    entries: impl IntoIterator<Item = TimeEntry>,
    aliases: &BTreeMap<String, String>,
    use_first_word_only: bool,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for entry in entries {
        let key = match entry.task_name.as_deref() {
            Some(name) if !name.trim().is_empty() => {
                derive_key(name, use_first_word_only)
            }
            _ => {
                outcome.without_task.push(entry);
                continue;
            }
        };
        let canonical = aliases.get(&key).cloned().unwrap_or(key);
        outcome.buckets.entry(canonical).or_default().push(entry);
    }

    for bucket in outcome.buckets.values_mut() {
        bucket.sort_by_key(|e| e.date);
    }
    outcome
}

fn derive_key(task_name: &str, use_first_word_only: bool) -> String {
    if use_first_word_only {
        task_name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string()
    } else {
        task_name.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn entry(date: &str, task: Option<&str>, comment: &str) -> TimeEntry {
        let mut e = TimeEntry::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            "Max",
            "Mustermann",
            "ACME",
            "P-100",
            dec!(8),
        );
        e.task_name = task.map(str::to_string);
        e.comment = Some(comment.to_string());
        e
    }

    fn aliases() -> BTreeMap<String, String> {
        BTreeMap::from([("T100".to_string(), "Development".to_string())])
    }

    #[test]
    fn first_word_key_with_alias_groups_under_canonical_name() {
        let entries = vec![entry("2024-03-04", Some("T100 Implementation Phase"), "a")];
        let outcome = merge_tasks(entries, &aliases(), true);
        assert_eq!(outcome.buckets.len(), 1);
        assert!(outcome.buckets.contains_key("Development"));
    }

    #[test]
    fn full_name_key_when_first_word_disabled() {
        let entries = vec![entry("2024-03-04", Some("  T100 Implementation  "), "a")];
        let outcome = merge_tasks(entries, &aliases(), false);
        assert!(outcome.buckets.contains_key("T100 Implementation"));
    }

    #[test]
    fn unmapped_keys_pass_through() {
        let entries = vec![entry("2024-03-04", Some("T200 Support"), "a")];
        let outcome = merge_tasks(entries, &aliases(), true);
        assert!(outcome.buckets.contains_key("T200"));
    }

    #[test]
    fn entries_without_task_are_reported_not_dropped() {
        let entries = vec![
            entry("2024-03-04", Some("T100 Impl"), "a"),
            entry("2024-03-05", None, "b"),
            entry("2024-03-06", Some("   "), "c"),
        ];
        let outcome = merge_tasks(entries, &aliases(), true);
        assert_eq!(outcome.total_entries(), 1);
        assert_eq!(outcome.without_task.len(), 2);
    }

    #[test]
    fn buckets_are_date_sorted_and_stable() {
        let entries = vec![
            entry("2024-03-06", Some("T100 x"), "third"),
            entry("2024-03-04", Some("T100 x"), "first"),
            entry("2024-03-04", Some("T100 x"), "second"),
        ];
        let outcome = merge_tasks(entries, &aliases(), true);
        let bucket = outcome.buckets.get("Development").unwrap();
        let comments: Vec<_> = bucket.iter().filter_map(|e| e.comment.as_deref()).collect();
        assert_eq!(comments, vec!["first", "second", "third"]);
    }

    #[test]
    fn merge_is_associative_over_grouping_order() {
        let a = entry("2024-03-04", Some("T100 x"), "a");
        let b = entry("2024-03-05", Some("T100 y"), "b");
        let c = entry("2024-03-03", Some("T200 z"), "c");

        let direct = merge_tasks(vec![a.clone(), b.clone(), c.clone()], &aliases(), true);

        let first = merge_tasks(vec![a, b], &aliases(), true);
        let mut staged_entries: Vec<TimeEntry> =
            first.buckets.into_values().flatten().collect();
        staged_entries.push(c);
        let staged = merge_tasks(staged_entries, &aliases(), true);

        assert_eq!(direct.buckets, staged.buckets);
    }
}
