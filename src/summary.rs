//! Dashboard views composed from the ranking and grouping engines.
//!
//! Every function takes the row collection as a plain argument and never
//! mutates it; the same snapshot always produces the same views.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::chart::BarChart;
use crate::grouping::sorted_group_average;
use crate::models::{RankedClient, Record, RmAverage, Snapshot, OVERALL_SCORE_FIELD, RM_FIELD};
use crate::ranking::{best, project, rank_descending, top_n};

pub const NO_DATA: &str = "—";

pub fn active_count(records: &[Record]) -> usize {
    records.len()
}

pub fn best_client(records: &[Record]) -> String {
    best(records, OVERALL_SCORE_FIELD)
        .map(|winner| winner.name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| NO_DATA.to_string())
}

pub fn top3(records: &[Record]) -> Vec<RankedClient> {
    top_n(records, OVERALL_SCORE_FIELD, 3)
}

pub fn top_vs_bottom(records: &[Record]) -> Vec<&Record> {
    rank_descending(records, OVERALL_SCORE_FIELD)
}

pub fn rm_performance(records: &[Record]) -> Vec<RmAverage> {
    sorted_group_average(records, RM_FIELD, OVERALL_SCORE_FIELD)
        .into_iter()
        .map(|group| RmAverage {
            rm: group.key,
            average: group.average,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCharts {
    pub top_vs_bottom: BarChart,
    pub rm_performance: BarChart,
}

/// Everything the dashboard renders for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub generated_at: DateTime<Utc>,
    pub active_count: usize,
    /// Passed through from the stats source, never recomputed from rows.
    pub average_overall_score: Option<Value>,
    pub best_client: String,
    pub top3: Vec<RankedClient>,
    pub ranking: Vec<RankedClient>,
    pub rm_performance: Vec<RmAverage>,
    pub charts: DashboardCharts,
}

impl DashboardSummary {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let rows = &snapshot.rows;
        let ranking: Vec<RankedClient> = top_vs_bottom(rows)
            .into_iter()
            .map(|record| project(record, OVERALL_SCORE_FIELD))
            .collect();
        let rm_performance = rm_performance(rows);

        Self {
            generated_at: snapshot.fetched_at,
            active_count: active_count(rows),
            average_overall_score: snapshot.average_overall_score().cloned(),
            best_client: best_client(rows),
            top3: top3(rows),
            charts: DashboardCharts {
                top_vs_bottom: BarChart::top_vs_bottom(&ranking),
                rm_performance: BarChart::rm_performance(&rm_performance),
            },
            ranking,
            rm_performance,
        }
    }
}
