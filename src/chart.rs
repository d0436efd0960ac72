use serde::Serialize;

use crate::models::{RankedClient, RmAverage};
use crate::tier::classify_tier;

/// Scores are out of 30, so both charts pin their value axis there.
pub const SCORE_AXIS_MAX: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Bar chart payload: parallel label/value/color vectors, one entry per bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub series_label: String,
    pub orientation: Orientation,
    pub axis_max: f64,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl BarChart {
    pub fn top_vs_bottom(ranking: &[RankedClient]) -> Self {
        Self::build(
            "Top vs Bottom Performing Campuses",
            "Overall Score",
            Orientation::Vertical,
            "No data yet…",
            ranking
                .iter()
                .map(|client| (client.name.clone(), client.score)),
        )
    }

    pub fn rm_performance(rms: &[RmAverage]) -> Self {
        Self::build(
            "RM Performance",
            "Avg Overall Score",
            Orientation::Horizontal,
            "No data available",
            rms.iter().map(|rm| (rm.rm.clone(), rm.average)),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn build(
        title: &str,
        series_label: &str,
        orientation: Orientation,
        placeholder: &str,
        bars: impl Iterator<Item = (String, f64)>,
    ) -> Self {
        let mut chart = Self {
            title: title.to_string(),
            series_label: series_label.to_string(),
            orientation,
            axis_max: SCORE_AXIS_MAX,
            labels: Vec::new(),
            values: Vec::new(),
            colors: Vec::new(),
            placeholder: None,
        };

        for (label, value) in bars {
            chart.labels.push(label);
            chart.colors.push(classify_tier(value).color().to_string());
            chart.values.push(value);
        }

        if chart.is_empty() {
            chart.placeholder = Some(placeholder.to_string());
        }
        chart
    }
}
