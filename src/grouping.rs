use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{GroupStats, GroupSummary, Record};
use crate::normalize::{key_of, normalize_score};

/// Per-group member count and mean of `value_field`, keyed by `key_field`.
///
/// Records without a key land in the `"Unknown"` group. Iteration order of the
/// returned map is unspecified; use [`sorted_group_average`] for display.
pub fn group_average(
    records: &[Record],
    key_field: &str,
    value_field: &str,
) -> HashMap<String, GroupStats> {
    collect_groups(records, key_field, value_field)
        .into_iter()
        .map(|summary| {
            (
                summary.key,
                GroupStats {
                    count: summary.count,
                    average: summary.average,
                },
            )
        })
        .collect()
}

/// Groups ordered by average, best first. Ties keep first-seen group order.
pub fn sorted_group_average(
    records: &[Record],
    key_field: &str,
    value_field: &str,
) -> Vec<GroupSummary> {
    let mut summaries = collect_groups(records, key_field, value_field);
    summaries.sort_by(|a, b| b.average.partial_cmp(&a.average).unwrap_or(Ordering::Equal));
    summaries
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn collect_groups(records: &[Record], key_field: &str, value_field: &str) -> Vec<GroupSummary> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();

    for record in records {
        let key = key_of(record, key_field);
        let score = normalize_score(record, value_field);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(score);
    }

    groups
        .into_iter()
        .map(|(key, scores)| {
            // A group only exists once a member has been pushed.
            let total: f64 = scores.iter().sum();
            GroupSummary {
                key,
                count: scores.len(),
                average: round2(total / scores.len() as f64),
            }
        })
        .collect()
}
