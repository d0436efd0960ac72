use std::fmt::Write;

use serde_json::Value;

use crate::models::Record;
use crate::summary::{DashboardSummary, NO_DATA};
use crate::tier::classify_tier;

pub fn build_report(summary: &DashboardSummary, rows: &[Record]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# ERP Usage Intelligence");
    let _ = writeln!(
        output,
        "Snapshot fetched {}",
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Active institutions: {}", summary.active_count);
    let _ = writeln!(
        output,
        "- Avg overall score: {} / 30",
        format_average(summary.average_overall_score.as_ref())
    );
    let _ = writeln!(output, "- Top performing: {}", summary.best_client);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top 3 Clients");

    if summary.top3.is_empty() {
        let _ = writeln!(output, "No clients in this snapshot.");
    } else {
        for (position, client) in summary.top3.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}. {} ({:.2})",
                position + 1,
                client.name,
                client.score
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top vs Bottom Performing Campuses");

    if summary.ranking.is_empty() {
        let _ = writeln!(output, "No data yet.");
    } else {
        for client in summary.ranking.iter() {
            let _ = writeln!(
                output,
                "- {}: {:.2} ({})",
                client.name,
                client.score,
                classify_tier(client.score).label()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## RM Performance");

    if summary.rm_performance.is_empty() {
        let _ = writeln!(output, "No data available.");
    } else {
        for rm in summary.rm_performance.iter() {
            let _ = writeln!(
                output,
                "- {}: {:.2} / 30 ({})",
                rm.rm,
                rm.average,
                classify_tier(rm.average).label()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## All Clients");
    write_table(&mut output, rows);

    output
}

fn format_average(average: Option<&Value>) -> String {
    match average {
        None | Some(Value::Null) => NO_DATA.to_string(),
        Some(value) => cell_text(Some(value)),
    }
}

/// Columns come from the first row, in source order.
fn write_table(output: &mut String, rows: &[Record]) {
    let Some(first) = rows.first() else {
        let _ = writeln!(output, "No rows in this snapshot.");
        return;
    };
    let columns: Vec<&str> = first.field_names().collect();

    let _ = writeln!(
        output,
        "| {} |",
        columns
            .iter()
            .map(|column| escape_cell(column))
            .collect::<Vec<_>>()
            .join(" | ")
    );
    let _ = writeln!(output, "|{}", " --- |".repeat(columns.len()));

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| escape_cell(&cell_text(row.get(column))))
            .collect();
        let _ = writeln!(output, "| {} |", cells.join(" | "));
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
