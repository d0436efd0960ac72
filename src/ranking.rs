use std::cmp::Ordering;

use crate::models::{RankedClient, Record};
use crate::normalize::{client_of, normalize_score};

/// Records ordered by `field`, highest first. Equal scores keep input order.
pub fn rank_descending<'a>(records: &'a [Record], field: &str) -> Vec<&'a Record> {
    let mut scored: Vec<(&Record, f64)> = records
        .iter()
        .map(|record| (record, normalize_score(record, field)))
        .collect();

    // Vec::sort_by is stable; refresh-to-refresh bar order depends on it.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(record, _)| record).collect()
}

pub fn top_n(records: &[Record], field: &str, n: usize) -> Vec<RankedClient> {
    rank_descending(records, field)
        .into_iter()
        .take(n)
        .map(|record| project(record, field))
        .collect()
}

/// Highest scoring client, or `None` when there are no records.
///
/// The current best is only replaced by a strictly greater score, so the
/// earliest record wins a tie.
pub fn best(records: &[Record], field: &str) -> Option<RankedClient> {
    let mut iter = records.iter();
    let first = project(iter.next()?, field);

    Some(iter.fold(first, |current, record| {
        let score = normalize_score(record, field);
        if score > current.score {
            RankedClient {
                name: client_of(record),
                score,
            }
        } else {
            current
        }
    }))
}

pub(crate) fn project(record: &Record, field: &str) -> RankedClient {
    RankedClient {
        name: client_of(record),
        score: normalize_score(record, field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const SCORE: &str = "Overall Score";

    fn client(name: &str, score: impl Into<Value>) -> Record {
        Record::new().with("Client", name).with(SCORE, score)
    }

    fn names(records: &[&Record]) -> Vec<String> {
        records.iter().map(|record| client_of(record)).collect()
    }

    #[test]
    fn ranks_highest_first() {
        let records = vec![client("A", 12), client("B", "27.5"), client("C", 19)];
        let ranked = rank_descending(&records, SCORE);
        assert_eq!(names(&ranked), vec!["B", "C", "A"]);
    }

    #[test]
    fn ranking_is_a_monotonic_permutation() {
        let records = vec![
            client("A", 3),
            client("B", "N/A"),
            client("C", 29),
            client("D", -1),
            client("E", "15.5"),
            client("F", 3),
        ];
        let ranked = rank_descending(&records, SCORE);
        assert_eq!(ranked.len(), records.len());
        for record in &records {
            assert_eq!(ranked.iter().filter(|r| ***r == *record).count(), 1);
        }
        for pair in ranked.windows(2) {
            assert!(normalize_score(pair[0], SCORE) >= normalize_score(pair[1], SCORE));
        }
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let records = vec![
            client("First", 10),
            client("Top", 20),
            client("Second", "10"),
            client("Third", 10.0),
        ];
        let ranked = rank_descending(&records, SCORE);
        assert_eq!(names(&ranked), vec!["Top", "First", "Second", "Third"]);
    }

    #[test]
    fn malformed_scores_sink_to_zero() {
        let records = vec![client("Broken", "N/A"), client("Fine", 1)];
        let ranked = rank_descending(&records, SCORE);
        assert_eq!(names(&ranked), vec!["Fine", "Broken"]);
    }

    #[test]
    fn top_n_projects_name_and_score() {
        let records = vec![client("A", 5), client("B", 25), client("C", 15)];
        let top = top_n(&records, SCORE, 2);
        assert_eq!(
            top,
            vec![
                RankedClient {
                    name: "B".to_string(),
                    score: 25.0
                },
                RankedClient {
                    name: "C".to_string(),
                    score: 15.0
                },
            ]
        );
    }

    #[test]
    fn top_n_larger_than_input_returns_everything() {
        let records = vec![client("A", 5), client("B", 25)];
        let top = top_n(&records, SCORE, 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "B");
        assert!(top_n(&[], SCORE, 3).is_empty());
    }

    #[test]
    fn best_of_nothing_is_none() {
        assert_eq!(best(&[], SCORE), None);
    }

    #[test]
    fn best_of_single_string_score() {
        let records = vec![client("X", "12.5")];
        assert_eq!(
            best(&records, SCORE),
            Some(RankedClient {
                name: "X".to_string(),
                score: 12.5
            })
        );
    }

    #[test]
    fn overflowing_score_outranks_finite_ones() {
        let records = vec![client("Small", 1), client("Huge", "1e400")];
        let winner = best(&records, SCORE).unwrap();
        assert_eq!(winner.name, "Huge");
        assert_eq!(winner.score, f64::INFINITY);
        assert_eq!(names(&rank_descending(&records, SCORE)), vec!["Huge", "Small"]);
    }

    #[test]
    fn best_prefers_earliest_on_tie() {
        let records = vec![client("Low", 4), client("Early", 22), client("Late", 22)];
        assert_eq!(best(&records, SCORE).map(|b| b.name), Some("Early".to_string()));
    }

    #[test]
    fn best_is_stable_across_calls() {
        let records = vec![client("A", 9), client("B", 11)];
        assert_eq!(best(&records, SCORE), best(&records, SCORE));
        assert_eq!(top_n(&records, SCORE, 2), top_n(&records, SCORE, 2));
    }
}
