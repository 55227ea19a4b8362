//! Ranking results into a leaderboard.
//!
//! Within a benchmark, only the latest result of each `(code, machine)` pair
//! is kept. The survivors are then ordered by the benchmark's `sort_by` key.

use crate::meta::{BenchmarkMeta, Catalogue, SortDir};
use crate::result::{ResultRecord, DATE_KEY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Leftmost columns that every table has: rank, code, machine.
pub const FIXED_COLUMNS: usize = 3;

/// A ranked result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    /// 1-based rank; rank 1 is the best result
    pub rank: usize,
    /// The result itself
    #[serde(flatten)]
    pub record: ResultRecord,
}

impl RankedRow {
    /// Whether this row leads its table.
    pub fn is_best(&self) -> bool {
        self.rank == 1
    }
}

/// The table of one benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkBoard {
    /// Benchmark metadata
    pub meta: BenchmarkMeta,
    /// Result keys shown as columns
    pub columns: Vec<String>,
    /// Table column the rows are initially sorted by
    pub initial_sort_col: Option<usize>,
    /// Rows in rank order
    pub rows: Vec<RankedRow>,
}

/// Totals shown above the tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Benchmarks with at least one result
    pub benchmarks: usize,
    /// Results after deduplication
    pub results: usize,
    /// Distinct codes
    pub codes: Vec<String>,
    /// Distinct machines
    pub machines: Vec<String>,
    /// Latest parsed result date
    pub last_result: Option<DateTime<Utc>>,
}

impl Stats {
    /// `last_result` formatted for display, `N/A` when unknown.
    pub fn last_result_display(&self) -> String {
        self.last_result
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// The compiled leaderboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    /// Totals
    pub stats: Stats,
    /// One board per benchmark with results, ordered by benchmark id
    pub boards: Vec<BenchmarkBoard>,
    /// Project URL per code, empty when unknown
    pub code_urls: BTreeMap<String, String>,
}

impl Leaderboard {
    /// Rank `records` against `catalogue`.
    pub fn compile(
        catalogue: &Catalogue,
        records: Vec<ResultRecord>,
        code_urls: BTreeMap<String, String>,
    ) -> Self {
        let mut by_test: BTreeMap<String, Vec<ResultRecord>> = BTreeMap::new();
        for record in records {
            by_test.entry(record.test.clone()).or_default().push(record);
        }

        let boards: Vec<BenchmarkBoard> = by_test
            .into_iter()
            .map(|(test, records)| {
                let meta = catalogue
                    .get(&test)
                    .cloned()
                    .unwrap_or_else(|| BenchmarkMeta::bare(test));
                build_board(meta, dedupe_latest(records))
            })
            .collect();

        let rows = || boards.iter().flat_map(|b| b.rows.iter().map(|r| &r.record));
        let stats = Stats {
            benchmarks: boards.len(),
            results: rows().count(),
            codes: rows().map(|r| r.code.clone()).collect::<BTreeSet<_>>().into_iter().collect(),
            machines: rows()
                .map(|r| r.machine.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            last_result: rows()
                .filter_map(|r| r.date)
                .map(|dt| dt.with_timezone(&Utc))
                .max(),
        };

        Self {
            stats,
            boards,
            code_urls,
        }
    }

    /// Project URL of a code, if one is known.
    pub fn code_url(&self, code: &str) -> Option<&str> {
        self.code_urls
            .get(code)
            .map(String::as_str)
            .filter(|u| !u.is_empty())
    }
}

/// Keep the latest record of each `(code, machine)` pair.
///
/// "Latest" compares the parsed date, then the file modification time, then
/// discovery order. Survivors keep their discovery order.
pub fn dedupe_latest(records: Vec<ResultRecord>) -> Vec<ResultRecord> {
    let score = |idx: usize, r: &ResultRecord| {
        (
            r.date_ts().unwrap_or(-1.0),
            r.mtime_ts().unwrap_or(-1.0),
            idx,
        )
    };

    let mut best: HashMap<(&str, &str), (f64, f64, usize)> = HashMap::new();
    for (idx, r) in records.iter().enumerate() {
        let candidate = score(idx, r);
        let entry = best
            .entry((r.code.as_str(), r.machine.as_str()))
            .or_insert(candidate);
        if compare_scores(&candidate, entry) != Ordering::Less {
            *entry = candidate;
        }
    }
    let keep: HashSet<usize> = best.values().map(|s| s.2).collect();

    records
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| keep.contains(idx))
        .map(|(_, r)| r)
        .collect()
}

fn compare_scores(a: &(f64, f64, usize), b: &(f64, f64, usize)) -> Ordering {
    a.0.total_cmp(&b.0)
        .then(a.1.total_cmp(&b.1))
        .then(a.2.cmp(&b.2))
}

fn build_board(meta: BenchmarkMeta, mut records: Vec<ResultRecord>) -> BenchmarkBoard {
    let columns = if meta.template_keys.is_empty() {
        union_of_keys(&records)
    } else {
        meta.template_keys.clone()
    };

    let mut initial_sort_col = None;
    if let Some(key) = meta.ranking_key() {
        sort_records(&mut records, key, meta.sort_dir);
        initial_sort_col = columns
            .iter()
            .position(|c| c == key)
            .map(|i| FIXED_COLUMNS + i);
    }

    let rows = records
        .into_iter()
        .enumerate()
        .map(|(i, record)| RankedRow {
            rank: i + 1,
            record,
        })
        .collect();

    BenchmarkBoard {
        meta,
        columns,
        initial_sort_col,
        rows,
    }
}

fn union_of_keys(records: &[ResultRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    for key in records.iter().flat_map(|r| r.fields.keys()) {
        if seen.insert(key.as_str()) {
            keys.push(key.clone());
        }
    }
    keys
}

/// A comparable view of a cell value.
#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Number(if *b { 1.0 } else { 0.0 })),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(match s.trim().parse::<f64>() {
                Ok(n) => Self::Number(n),
                Err(_) => Self::Text(s.to_lowercase()),
            }),
            other => Some(Self::Text(other.to_string().to_lowercase())),
        }
    }
}

fn sort_value(record: &ResultRecord, key: &str) -> Option<SortValue> {
    if key == DATE_KEY {
        if let Some(ts) = record.date_ts() {
            return Some(SortValue::Number(ts));
        }
    }
    record.field(key).and_then(SortValue::from_value)
}

/// Stable sort by `key`. Missing values always go last.
///
/// `Desc` reverses present values only; rows without a value stay at the
/// bottom in both directions.
pub fn sort_records(records: &mut [ResultRecord], key: &str, dir: SortDir) {
    records.sort_by(|a, b| match (sort_value(a, key), sort_value(b, key)) {
        (Some(a), Some(b)) => match dir {
            SortDir::Asc => a.cmp(&b),
            SortDir::Desc => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use astrobench_core::ResultLocation;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(code: &str, machine: &str, commit: &str, fields: Value) -> ResultRecord {
        let loc = ResultLocation::new(code, machine, "sod", commit).unwrap();
        let keys: Vec<String> = fields.as_object().unwrap().keys().cloned().collect();
        ResultRecord::from_json(&loc, format!("{code}/{machine}/{commit}"), &fields, &keys, None)
            .unwrap()
    }

    fn commits(records: &[ResultRecord]) -> Vec<&str> {
        records.iter().map(|r| r.commit.as_str()).collect()
    }

    #[test]
    fn test_dedupe_keeps_latest_date() {
        let records = vec![
            record("athena", "laptop", "new", json!({"date": "2024-06-01"})),
            record("ramses", "laptop", "other", json!({"date": "2024-01-01"})),
            record("athena", "laptop", "old", json!({"date": "2024-01-01"})),
        ];
        assert_eq!(commits(&dedupe_latest(records)), ["new", "other"]);
    }

    #[test]
    fn test_dedupe_falls_back_to_mtime_then_order() {
        let mut a = record("athena", "laptop", "a", json!({"runtime": 1}));
        let mut b = record("athena", "laptop", "b", json!({"runtime": 2}));
        a.mtime = Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        b.mtime = Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(commits(&dedupe_latest(vec![a.clone(), b.clone()])), ["a"]);

        a.mtime = None;
        b.mtime = None;
        assert_eq!(commits(&dedupe_latest(vec![a, b])), ["b"]);
    }

    #[test]
    fn test_dedupe_separates_machines() {
        let records = vec![
            record("athena", "laptop", "a", json!({})),
            record("athena", "cluster", "b", json!({})),
        ];
        assert_eq!(dedupe_latest(records).len(), 2);
    }

    #[test]
    fn test_sort_ascending_numbers_before_text_missing_last() {
        let mut records = vec![
            record("a", "m", "text", json!({"runtime": "n/a"})),
            record("b", "m", "missing", json!({"runtime": null})),
            record("c", "m", "slow", json!({"runtime": 20})),
            record("d", "m", "fast", json!({"runtime": "3.5"})),
        ];
        sort_records(&mut records, "runtime", SortDir::Asc);
        assert_eq!(commits(&records), ["fast", "slow", "text", "missing"]);
    }

    #[test]
    fn test_sort_descending_keeps_missing_last_and_is_stable() {
        let mut records = vec![
            record("a", "m", "missing", json!({"score": null})),
            record("b", "m", "tie1", json!({"score": 5})),
            record("c", "m", "best", json!({"score": 9})),
            record("d", "m", "tie2", json!({"score": 5.0})),
        ];
        sort_records(&mut records, "score", SortDir::Desc);
        assert_eq!(commits(&records), ["best", "tie1", "tie2", "missing"]);
    }

    #[test]
    fn test_sort_text_is_case_insensitive() {
        let mut records = vec![
            record("a", "m", "b", json!({"solver": "beta"})),
            record("b", "m", "a", json!({"solver": "Alpha"})),
        ];
        sort_records(&mut records, "solver", SortDir::Asc);
        assert_eq!(commits(&records), ["a", "b"]);
    }

    #[test]
    fn test_sort_by_date_uses_timestamp() {
        let mut records = vec![
            record("a", "m", "late", json!({"date": "2024-05-02T00:00:00+05:00"})),
            record("b", "m", "early", json!({"date": "2024-05-01T22:00:00Z"})),
        ];
        sort_records(&mut records, "date", SortDir::Asc);
        assert_eq!(commits(&records), ["late", "early"]);
    }

    #[test]
    fn test_compile_ranks_and_counts() {
        let mut meta = BenchmarkMeta::bare("sod");
        meta.template_keys = vec!["commit".into(), "runtime".into()];
        meta.sort_by = Some("runtime".into());
        let catalogue = Catalogue::from([("sod".to_string(), meta)]);

        let records = vec![
            record("athena", "laptop", "c1", json!({"runtime": 9, "date": "2024-01-01"})),
            record("ramses", "cluster", "c2", json!({"runtime": 4, "date": "2024-02-01"})),
            record("athena", "laptop", "c3", json!({"runtime": 7, "date": "2024-03-01"})),
        ];
        let board = Leaderboard::compile(&catalogue, records, BTreeMap::new());

        assert_eq!(board.stats.benchmarks, 1);
        assert_eq!(board.stats.results, 2);
        assert_eq!(board.stats.codes, ["athena", "ramses"]);
        assert_eq!(board.stats.machines, ["cluster", "laptop"]);
        assert_eq!(board.stats.last_result_display(), "2024-03-01 00:00:00 UTC");

        let sod = &board.boards[0];
        assert_eq!(sod.columns, ["commit", "runtime"]);
        assert_eq!(sod.initial_sort_col, Some(4));
        let ranked: Vec<(usize, &str)> = sod
            .rows
            .iter()
            .map(|r| (r.rank, r.record.commit.as_str()))
            .collect();
        assert_eq!(ranked, [(1, "c2"), (2, "c3")]);
        assert!(sod.rows[0].is_best());
    }

    #[test]
    fn test_compile_unknown_benchmark_uses_union_of_keys() {
        let records = vec![
            record("athena", "laptop", "c1", json!({"runtime": 1})),
            record("ramses", "laptop", "c2", json!({"memory": 2, "runtime": 3})),
        ];
        let board = Leaderboard::compile(&Catalogue::new(), records, BTreeMap::new());
        let sod = &board.boards[0];
        assert_eq!(sod.meta.name, "sod");
        assert_eq!(sod.columns, ["runtime", "memory"]);
        assert_eq!(sod.initial_sort_col, None);
        assert_eq!(board.stats.last_result_display(), "N/A");
    }

    #[test]
    fn test_setup_is_never_an_initial_sort() {
        let mut meta = BenchmarkMeta::bare("sod");
        meta.template_keys = vec!["setup".into()];
        meta.sort_by = Some("setup".into());
        let catalogue = Catalogue::from([("sod".to_string(), meta)]);
        let records = vec![record("athena", "laptop", "c1", json!({"setup": "https://x"}))];
        let board = Leaderboard::compile(&catalogue, records, BTreeMap::new());
        assert_eq!(board.boards[0].initial_sort_col, None);
    }

    #[test]
    fn test_code_url_ignores_empty() {
        let urls = BTreeMap::from([
            ("athena".to_string(), "https://athena.example".to_string()),
            ("ramses".to_string(), String::new()),
        ]);
        let board = Leaderboard::compile(&Catalogue::new(), Vec::new(), urls);
        assert_eq!(board.code_url("athena"), Some("https://athena.example"));
        assert_eq!(board.code_url("ramses"), None);
        assert_eq!(board.code_url("enzo"), None);
        assert!(board.boards.is_empty());
    }
}
