use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CLIENT_FIELD: &str = "Client";
pub const RM_FIELD: &str = "RM";
pub const OVERALL_SCORE_FIELD: &str = "Overall Score";

/// One client/campus usage row. Field order follows the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<Value>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Aggregates served by the stats endpoint. Values are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub average_overall_score: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub rows: Vec<Record>,
    pub stats: Option<Stats>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(rows: Vec<Record>, stats: Option<Stats>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            rows,
            stats,
            fetched_at,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), None, DateTime::<Utc>::default())
    }

    pub fn average_overall_score(&self) -> Option<&Value> {
        self.stats
            .as_ref()
            .and_then(|stats| stats.average_overall_score.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedClient {
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub count: usize,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RmAverage {
    pub rm: String,
    pub average: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_keep_source_field_order() {
        let record: Record =
            serde_json::from_value(json!({"Client": "A", "RM": "Lee", "Overall Score": 12}))
                .unwrap();
        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["Client", "RM", "Overall Score"]);
    }

    #[test]
    fn stats_keep_unknown_fields() {
        let stats: Stats =
            serde_json::from_value(json!({"average_overall_score": 18.4, "total": 42})).unwrap();
        assert_eq!(stats.average_overall_score, Some(json!(18.4)));
        assert_eq!(stats.extra.get("total"), Some(&json!(42)));
    }

    #[test]
    fn stats_average_of_any_type_is_kept_as_is() {
        let stats: Stats =
            serde_json::from_value(json!({"average_overall_score": "17.30"})).unwrap();
        assert_eq!(stats.average_overall_score, Some(json!("17.30")));

        let stats: Stats = serde_json::from_value(json!({"average_overall_score": null})).unwrap();
        assert_eq!(stats.average_overall_score, None);
    }

    #[test]
    fn snapshot_without_stats_has_no_average() {
        assert_eq!(Snapshot::empty().average_overall_score(), None);
    }
}
