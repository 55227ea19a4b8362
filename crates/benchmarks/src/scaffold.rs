//! Scaffolding a new submission from a benchmark's `template.json`.

use crate::io::read_json;
use crate::meta::BenchmarkMeta;
use crate::result::{COMMIT_KEY, DATE_KEY};
use astrobench_core::layout::RESULT_FILE;
use astrobench_core::{Error, Layout, Result, ResultLocation};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Build the initial contents of a `result.json`.
///
/// Keys come from `template.json` in file order, with template values as
/// placeholders. `commit`, `code`, `machine` and `date` are filled in when the
/// template has them.
pub fn result_skeleton(
    template: &Map<String, Value>,
    location: &ResultLocation,
    now: DateTime<Utc>,
) -> Map<String, Value> {
    template
        .iter()
        .map(|(key, placeholder)| {
            let value = match key.as_str() {
                COMMIT_KEY => Value::String(location.commit.clone()),
                "code" => Value::String(location.code.clone()),
                "machine" => Value::String(location.machine.clone()),
                DATE_KEY => Value::String(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
                _ => placeholder.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Write a skeleton `result.json` for `location`.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn scaffold_result(
    layout: &Layout,
    meta: &BenchmarkMeta,
    location: &ResultLocation,
    now: DateTime<Utc>,
    force: bool,
) -> Result<PathBuf> {
    let template_path = meta.dir.join("template.json");
    let template = match read_json(&template_path)? {
        Value::Object(map) => map,
        _ => {
            return Err(Error::invalid_input(format!(
                "{} is not a JSON object",
                template_path.display()
            )))
        }
    };

    let dir = layout.commit_dir(location);
    let path = dir.join(RESULT_FILE);
    if path.exists() && !force {
        return Err(Error::invalid_input(format!(
            "{} already exists, pass --force to overwrite",
            layout.relative(&path)
        )));
    }

    let skeleton = Value::Object(result_skeleton(&template, location, now));
    let json = serde_json::to_string_pretty(&skeleton).map_err(|e| Error::json(&path, e))?;
    fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
    fs::write(&path, json + "\n").map_err(|e| Error::io(&path, e))?;
    info!(path = %path.display(), "scaffolded result");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn location() -> ResultLocation {
        ResultLocation::new("athena", "laptop", "sod", "abc123").unwrap()
    }

    #[test]
    fn test_skeleton_fills_known_keys_in_order() {
        let template = json!({"runtime": 0.0, "commit": "", "date": "", "setup": "https://"});
        let skeleton = result_skeleton(template.as_object().unwrap(), &location(), now());

        let keys: Vec<&String> = skeleton.keys().collect();
        assert_eq!(keys, ["runtime", "commit", "date", "setup"]);
        assert_eq!(skeleton["runtime"], json!(0.0));
        assert_eq!(skeleton["commit"], json!("abc123"));
        assert_eq!(skeleton["date"], json!("2024-06-01T08:00:00Z"));
        assert_eq!(skeleton["setup"], json!("https://"));
    }

    #[test]
    fn test_scaffold_writes_and_refuses_overwrite() {
        let root = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        let mut meta = BenchmarkMeta::bare("sod");
        meta.dir = layout.benchmarks_dir.join("sod");
        fs::create_dir_all(&meta.dir).unwrap();
        fs::write(meta.dir.join("template.json"), r#"{"commit": "", "runtime": null}"#).unwrap();

        let path = scaffold_result(&layout, &meta, &location(), now(), false).unwrap();
        assert_eq!(path, layout.commit_dir(&location()).join(RESULT_FILE));
        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"commit": "abc123", "runtime": null}));

        let err = scaffold_result(&layout, &meta, &location(), now(), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(scaffold_result(&layout, &meta, &location(), now(), true).is_ok());
    }

    #[test]
    fn test_scaffold_requires_template() {
        let root = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        let mut meta = BenchmarkMeta::bare("sod");
        meta.dir = layout.benchmarks_dir.join("sod");
        assert!(scaffold_result(&layout, &meta, &location(), now(), false).is_err());
    }
}
