//! Markdown output generation for the leaderboard.
//!
//! The summary mirrors the HTML tables in plain Markdown, handy for pull
//! request comments and release notes.

use crate::html::{column_label, display_value};
use crate::rank::{BenchmarkBoard, Leaderboard};
use crate::result::{COMMIT_KEY, DATE_KEY};
use chrono::{DateTime, Utc};

/// Make a value safe inside a Markdown table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Generate a markdown summary of the leaderboard.
pub fn generate_summary(board: &Leaderboard, generated_at: DateTime<Utc>) -> String {
    let mut lines = vec![
        "# Leaderboard Summary".to_string(),
        String::new(),
        format!("Generated: {}", generated_at.to_rfc3339()),
        String::new(),
    ];

    if board.boards.is_empty() {
        lines.push("No results found in `results/`.".to_string());
        lines.push(String::new());
    }

    for b in &board.boards {
        lines.extend(benchmark_section(b));
    }

    let stats = &board.stats;
    lines.push("---".to_string());
    lines.push(format!(
        "Total: {} benchmarks, {} results, {} codes, {} machines. Last result: {}",
        stats.benchmarks,
        stats.results,
        stats.codes.len(),
        stats.machines.len(),
        stats.last_result_display()
    ));
    lines.push(String::new());
    lines.join("\n")
}

fn benchmark_section(b: &BenchmarkBoard) -> Vec<String> {
    let meta = &b.meta;
    let mut lines = vec![format!("## {}", meta.name), String::new()];
    if !meta.description.is_empty() {
        lines.push(meta.description.clone());
        lines.push(String::new());
    }

    let mut header = vec!["Rank".to_string(), "Code".to_string(), "Machine".to_string()];
    header.extend(b.columns.iter().map(|k| cell(&column_label(k))));
    lines.push(format!("| {} |", header.join(" | ")));
    lines.push(format!("|{}", "------|".repeat(header.len())));

    for row in &b.rows {
        let r = &row.record;
        let mut cells = vec![row.rank.to_string(), cell(&r.code), cell(&r.machine)];
        for key in &b.columns {
            let text = match (key.as_str(), r.date) {
                (DATE_KEY, Some(date)) => date.format("%Y-%m-%d").to_string(),
                (COMMIT_KEY, _) => display_value(r.fields.get(key)).chars().take(8).collect(),
                _ => display_value(r.fields.get(key)),
            };
            cells.push(cell(&text));
        }
        lines.push(format!("| {} |", cells.join(" | ")));
    }
    lines.push(String::new());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{BenchmarkMeta, Catalogue};
    use crate::result::ResultRecord;
    use astrobench_core::ResultLocation;
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_summary_tables() {
        let mut meta = BenchmarkMeta::bare("sod");
        meta.name = "Sod shock tube".into();
        meta.template_keys = vec!["runtime".into(), "commit".into(), "notes".into()];
        meta.sort_by = Some("runtime".into());
        let catalogue = Catalogue::from([("sod".to_string(), meta)]);

        let keys = meta_keys(&catalogue);
        let loc = ResultLocation::new("athena", "laptop", "sod", "c1").unwrap();
        let data = json!({"runtime": 1.25, "commit": "0123456789ab", "notes": "a|b"});
        let record = ResultRecord::from_json(&loc, "f", &data, &keys, None).unwrap();

        let board = Leaderboard::compile(&catalogue, vec![record], BTreeMap::new());
        let md = generate_summary(&board, generated_at());

        assert!(md.starts_with("# Leaderboard Summary\n"));
        assert!(md.contains("Generated: 2024-06-01T08:00:00+00:00"));
        assert!(md.contains("## Sod shock tube"));
        assert!(md.contains("| Rank | Code | Machine | Runtime | Commit | Notes |"));
        assert!(md.contains("| 1 | athena | laptop | 1.25 | 01234567 | a\\|b |"));
        assert!(md.contains("Total: 1 benchmarks, 1 results, 1 codes, 1 machines."));
    }

    #[test]
    fn test_summary_date_uses_written_offset() {
        let mut meta = BenchmarkMeta::bare("sod");
        meta.template_keys = vec!["date".into()];
        let catalogue = Catalogue::from([("sod".to_string(), meta)]);

        let loc = ResultLocation::new("athena", "laptop", "sod", "c1").unwrap();
        let data = json!({"date": "2024-05-01T23:30:00-04:00"});
        let record = ResultRecord::from_json(&loc, "f", &data, &meta_keys(&catalogue), None).unwrap();

        let board = Leaderboard::compile(&catalogue, vec![record], BTreeMap::new());
        let md = generate_summary(&board, generated_at());
        assert!(md.contains("| 1 | athena | laptop | 2024-05-01 |"));
    }

    #[test]
    fn test_summary_without_results() {
        let md = generate_summary(&Leaderboard::default(), generated_at());
        assert!(md.contains("No results found in `results/`."));
        assert!(md.contains("Last result: N/A"));
    }

    fn meta_keys(catalogue: &Catalogue) -> Vec<String> {
        catalogue["sod"].template_keys.clone()
    }
}
