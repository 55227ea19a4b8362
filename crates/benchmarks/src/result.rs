//! Submitted result records.
//!
//! A record is one `result.json` plus what its path says about it. Only the
//! benchmark's template keys are kept from the file.

use crate::io::read_json_lenient;
use astrobench_core::{Layout, ResultLocation};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::warn;

/// Keys that describe a record rather than a measurement.
pub const RESERVED_KEYS: &[&str] = &["code", "machine", "test", "file", "date_obj"];

/// Key holding the submission date.
pub const DATE_KEY: &str = "date";

/// Key holding the commit of the simulation code.
pub const COMMIT_KEY: &str = "commit";

/// One submitted result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Simulation code
    pub code: String,
    /// Machine the code ran on
    pub machine: String,
    /// Benchmark id
    pub test: String,
    /// Commit directory name
    pub commit: String,
    /// `result.json` path relative to the repository root
    pub file: String,
    /// Extracted values, in template order
    pub fields: Map<String, Value>,
    /// Parsed submission date, in the offset it was written with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<FixedOffset>>,
    /// Submission date as written in the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_raw: Option<Value>,
    /// Modification time of `result.json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime: Option<DateTime<Utc>>,
    /// Plot image path relative to the output directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
}

impl ResultRecord {
    /// Build a record from a parsed `result.json`.
    ///
    /// Returns `None` when `data` is not a JSON object. Every template key is
    /// extracted; keys absent from `data` are kept as `null`.
    pub fn from_json(
        location: &ResultLocation,
        file: impl Into<String>,
        data: &Value,
        template_keys: &[String],
        mtime: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        let object = data.as_object()?;

        let mut fields: Map<String, Value> = template_keys
            .iter()
            .map(|k| (k.clone(), object.get(k).cloned().unwrap_or(Value::Null)))
            .collect();

        let date_raw = fields
            .get(DATE_KEY)
            .filter(|v| !v.is_null())
            .or_else(|| object.get(DATE_KEY).filter(|v| !v.is_null()))
            .cloned();
        let date = date_raw.as_ref().and_then(Value::as_str).and_then(parse_date);
        if let Some(raw) = &date_raw {
            fields.insert(DATE_KEY.to_string(), raw.clone());
        }

        Some(Self {
            code: location.code.clone(),
            machine: location.machine.clone(),
            test: location.benchmark.clone(),
            commit: location.commit.clone(),
            file: file.into(),
            fields,
            date,
            date_raw,
            mtime,
            plot: None,
        })
    }

    /// Submission date as seconds since the epoch.
    pub fn date_ts(&self) -> Option<f64> {
        self.date.as_ref().map(timestamp)
    }

    /// File modification time as seconds since the epoch.
    pub fn mtime_ts(&self) -> Option<f64> {
        self.mtime.as_ref().map(timestamp)
    }

    /// Value of a field, treating `null` as absent.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }
}

fn timestamp<Tz: TimeZone>(dt: &DateTime<Tz>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9
}

/// Read and parse one `result.json`.
///
/// Unreadable files and files that are not JSON objects yield `None`.
pub fn parse_result_file(
    layout: &Layout,
    location: &ResultLocation,
    path: &Path,
    template_keys: &[String],
) -> Option<ResultRecord> {
    let data = read_json_lenient(path)?;
    let mtime = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from);
    let record =
        ResultRecord::from_json(location, layout.relative(path), &data, template_keys, mtime);
    if record.is_none() {
        warn!(path = %path.display(), "result is not a JSON object, skipping");
    }
    record
}

/// Parse an ISO-8601 date or date-time.
///
/// The written offset is kept. A trailing `Z` and values without an offset
/// get `+00:00`, and a bare date means midnight.
pub fn parse_date(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    let normalized = match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        Some(head) => format!("{head}+00:00"),
        None => s.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Some(dt);
        }
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}
