//! Walking the results tree.
//!
//! Results live at `results/<code>/<machine>/<benchmark>/<commit>/result.json`.
//! Directories are visited in name order so that every build sees the same
//! discovery order.

use crate::io::{read_json_lenient, sorted_subdirs};
use crate::meta::{BenchmarkMeta, Catalogue};
use crate::plot::{ensure_plot, PlotRenderer};
use crate::result::{parse_result_file, ResultRecord, RESERVED_KEYS};
use astrobench_core::layout::RESULT_FILE;
use astrobench_core::{Layout, Result, ResultLocation};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Name of a directory entry as an owned string.
pub(crate) fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Collect every parseable result in the repository.
///
/// Unreadable or malformed result files are logged and skipped. Plots are
/// requested from `plots` for benchmarks that declare a data file.
pub fn discover_results(
    layout: &Layout,
    catalogue: &Catalogue,
    plots: &dyn PlotRenderer,
) -> Result<Vec<ResultRecord>> {
    let mut records = Vec::new();

    for code_dir in sorted_subdirs(&layout.results_dir)? {
        for machine_dir in sorted_subdirs(&code_dir)? {
            for test_dir in sorted_subdirs(&machine_dir)? {
                let test = dir_name(&test_dir);
                let bare;
                let meta = match catalogue.get(&test) {
                    Some(meta) => meta,
                    None => {
                        debug!(benchmark = %test, "results for a benchmark without definition");
                        bare = BenchmarkMeta::bare(test.clone());
                        &bare
                    }
                };

                let commit_dirs = sorted_subdirs(&test_dir)?;
                let template_keys = if meta.template_keys.is_empty() {
                    infer_template_keys(&commit_dirs)
                } else {
                    meta.template_keys.clone()
                };

                for commit_dir in commit_dirs {
                    let result_file = commit_dir.join(RESULT_FILE);
                    if !result_file.is_file() {
                        continue;
                    }
                    let location = match ResultLocation::new(
                        dir_name(&code_dir),
                        dir_name(&machine_dir),
                        test.clone(),
                        dir_name(&commit_dir),
                    ) {
                        Ok(location) => location,
                        Err(e) => {
                            warn!(path = %result_file.display(), error = %e, "skipping result");
                            continue;
                        }
                    };
                    let Some(mut record) =
                        parse_result_file(layout, &location, &result_file, &template_keys)
                    else {
                        continue;
                    };
                    if meta.data_file {
                        record.plot = ensure_plot(layout, meta, &location, plots);
                    }
                    records.push(record);
                }
            }
        }
    }

    info!(count = records.len(), "discovered results");
    Ok(records)
}

/// Keys of the first result found, minus the reserved ones.
fn infer_template_keys(commit_dirs: &[std::path::PathBuf]) -> Vec<String> {
    let first = commit_dirs
        .iter()
        .map(|d| d.join(RESULT_FILE))
        .find(|f| f.is_file());
    match first.and_then(read_json_lenient) {
        Some(serde_json::Value::Object(map)) => map
            .keys()
            .filter(|k| !RESERVED_KEYS.contains(&k.as_str()))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Project URLs from `results/<code>/code.json`, empty when unknown.
pub fn load_code_urls<'a>(
    layout: &Layout,
    codes: impl IntoIterator<Item = &'a str>,
) -> BTreeMap<String, String> {
    codes
        .into_iter()
        .map(|code| {
            let url = read_json_lenient(layout.results_dir.join(code).join("code.json"))
                .as_ref()
                .and_then(|v| v.get("url"))
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            (code.to_string(), url)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::NoPlots;
    use std::fs;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_missing_results_dir_is_empty() {
        let root = tempfile::tempdir().unwrap();
        let records =
            discover_results(&Layout::new(root.path()), &Catalogue::new(), &NoPlots).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_walks_tree_in_name_order() {
        let root = tempfile::tempdir().unwrap();
        let r = root.path();
        write(r, "results/ramses/cluster/sod/c2/result.json", r#"{"runtime": 2}"#);
        write(r, "results/athena/laptop/sod/c1/result.json", r#"{"runtime": 1}"#);
        write(r, "results/athena/laptop/sod/c0/notes.txt", "no result here");
        write(r, "results/athena/laptop/sod/c3/result.json", "{broken");
        write(r, "results/athena/README.md", "stray file");

        let records =
            discover_results(&Layout::new(r), &Catalogue::new(), &NoPlots).unwrap();
        let seen: Vec<(&str, &str)> = records
            .iter()
            .map(|rec| (rec.code.as_str(), rec.commit.as_str()))
            .collect();
        assert_eq!(seen, [("athena", "c1"), ("ramses", "c2")]);
    }

    #[test]
    fn test_infers_keys_without_template() {
        let root = tempfile::tempdir().unwrap();
        let r = root.path();
        write(
            r,
            "results/athena/laptop/sod/c1/result.json",
            r#"{"code": "athena", "runtime": 1, "l1_error": 0.01}"#,
        );
        write(
            r,
            "results/athena/laptop/sod/c2/result.json",
            r#"{"runtime": 3, "memory": 12}"#,
        );

        let records =
            discover_results(&Layout::new(r), &Catalogue::new(), &NoPlots).unwrap();
        assert_eq!(records.len(), 2);
        let keys: Vec<&String> = records[1].fields.keys().collect();
        assert_eq!(keys, ["runtime", "l1_error"]);
    }

    #[test]
    fn test_code_urls() {
        let root = tempfile::tempdir().unwrap();
        let r = root.path();
        write(r, "results/athena/code.json", r#"{"url": "https://athena.example"}"#);
        write(r, "results/ramses/code.json", r#"{"name": "no url"}"#);

        let urls = load_code_urls(&Layout::new(r), ["athena", "ramses", "enzo"]);
        assert_eq!(urls["athena"], "https://athena.example");
        assert_eq!(urls["ramses"], "");
        assert_eq!(urls["enzo"], "");
    }
}
