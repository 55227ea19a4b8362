//! Local lint of the results tree.
//!
//! Reports what the leaderboard build would silently skip or render badly,
//! so contributors can fix a submission before opening a pull request.

use crate::discover::dir_name;
use crate::io::{read_json, sorted_subdirs};
use crate::meta::Catalogue;
use crate::result::{parse_date, DATE_KEY};
use astrobench_core::layout::RESULT_FILE;
use astrobench_core::{Layout, Result, ResultLocation};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// How bad an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Rendered, but something is missing or odd
    Warning,
    /// Skipped or incomplete on the leaderboard
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Severity
    pub severity: Severity,
    /// Path relative to the repository root
    pub path: String,
    /// What is wrong
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

struct Findings<'a> {
    layout: &'a Layout,
    issues: Vec<Issue>,
}

impl Findings<'_> {
    fn push(&mut self, severity: Severity, path: &Path, message: impl Into<String>) {
        self.issues.push(Issue {
            severity,
            path: self.layout.relative(path),
            message: message.into(),
        });
    }
}

/// Lint every submission under the results directory.
pub fn check_repository(layout: &Layout, catalogue: &Catalogue) -> Result<Vec<Issue>> {
    let mut findings = Findings {
        layout,
        issues: Vec::new(),
    };

    for code_dir in sorted_subdirs(&layout.results_dir)? {
        if !code_dir.join("code.json").is_file() {
            findings.push(
                Severity::Warning,
                &code_dir,
                "no code.json, the code will not link to its project page",
            );
        }
        for machine_dir in sorted_subdirs(&code_dir)? {
            if !machine_dir.join("machine.json").is_file() {
                findings.push(
                    Severity::Warning,
                    &machine_dir,
                    "no machine.json, the machine link will be broken",
                );
            }
            for test_dir in sorted_subdirs(&machine_dir)? {
                let test = dir_name(&test_dir);
                let template: &[String] = match catalogue.get(&test) {
                    Some(meta) => &meta.template_keys,
                    None => {
                        findings.push(
                            Severity::Warning,
                            &test_dir,
                            format!("unknown benchmark {test:?}, not found under benchmarks/"),
                        );
                        &[]
                    }
                };
                for commit_dir in sorted_subdirs(&test_dir)? {
                    if commit_dir.join(RESULT_FILE).is_file() {
                        let location = ResultLocation::new(
                            dir_name(&code_dir),
                            dir_name(&machine_dir),
                            test.clone(),
                            dir_name(&commit_dir),
                        );
                        if let Err(e) = location {
                            findings.push(
                                Severity::Error,
                                &commit_dir,
                                format!("skipped by the build: {e}"),
                            );
                            continue;
                        }
                    }
                    check_commit(&mut findings, &commit_dir, template);
                }
            }
        }
    }

    Ok(findings.issues)
}

fn check_commit(findings: &mut Findings<'_>, commit_dir: &Path, template: &[String]) {
    let file = commit_dir.join(RESULT_FILE);
    if !file.is_file() {
        findings.push(Severity::Warning, commit_dir, "no result.json");
        return;
    }

    let data = match read_json(&file) {
        Ok(data) => data,
        Err(e) => {
            findings.push(Severity::Error, &file, format!("cannot be read: {e}"));
            return;
        }
    };
    let Some(object) = data.as_object() else {
        findings.push(Severity::Error, &file, "is not a JSON object");
        return;
    };

    let missing: Vec<&str> = template
        .iter()
        .filter(|k| !object.contains_key(k.as_str()))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        findings.push(
            Severity::Error,
            &file,
            format!("missing template keys: {}", missing.join(", ")),
        );
    }

    match object.get(DATE_KEY) {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) if parse_date(s).is_some() => {}
        Some(other) => findings.push(
            Severity::Warning,
            &file,
            format!("date {other} is not an ISO-8601 date"),
        ),
    }
}

/// Whether any issue is an error.
pub fn has_errors(issues: &[Issue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::BenchmarkMeta;
    use std::fs;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn catalogue() -> Catalogue {
        let mut meta = BenchmarkMeta::bare("sod");
        meta.template_keys = vec!["runtime".into(), "date".into()];
        Catalogue::from([("sod".to_string(), meta)])
    }

    #[test]
    fn test_clean_tree_has_no_issues() {
        let root = tempfile::tempdir().unwrap();
        let r = root.path();
        write(r, "results/athena/code.json", r#"{"url": "https://x"}"#);
        write(r, "results/athena/laptop/machine.json", "{}");
        write(
            r,
            "results/athena/laptop/sod/c1/result.json",
            r#"{"runtime": 1, "date": "2024-05-01"}"#,
        );

        let issues = check_repository(&Layout::new(r), &catalogue()).unwrap();
        assert!(issues.is_empty(), "{issues:?}");
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_reports_problems() {
        let root = tempfile::tempdir().unwrap();
        let r = root.path();
        write(r, "results/athena/laptop/sod/c1/result.json", r#"{"runtime": 1}"#);
        write(r, "results/athena/laptop/sod/c2/result.json", "{oops");
        write(r, "results/athena/laptop/sod/c3/result.json", "[1]");
        write(
            r,
            "results/athena/laptop/sod/c4/result.json",
            r#"{"runtime": 1, "date": "soon"}"#,
        );
        fs::create_dir_all(r.join("results/athena/laptop/sod/c5")).unwrap();
        write(r, "results/athena/laptop/kh/c1/result.json", "{}");

        let issues = check_repository(&Layout::new(r), &catalogue()).unwrap();
        let find = |path: &str| {
            issues
                .iter()
                .find(|i| i.path == path)
                .unwrap_or_else(|| panic!("no issue for {path}: {issues:?}"))
        };

        assert_eq!(find("results/athena").severity, Severity::Warning);
        assert_eq!(find("results/athena/laptop").severity, Severity::Warning);
        assert!(find("results/athena/laptop/kh").message.contains("unknown benchmark"));

        let missing = find("results/athena/laptop/sod/c1/result.json");
        assert_eq!(missing.severity, Severity::Error);
        assert_eq!(missing.message, "missing template keys: date");

        assert!(find("results/athena/laptop/sod/c2/result.json")
            .message
            .starts_with("cannot be read"));
        assert_eq!(
            find("results/athena/laptop/sod/c3/result.json").message,
            "is not a JSON object"
        );
        let date = find("results/athena/laptop/sod/c4/result.json");
        assert_eq!(date.severity, Severity::Warning);
        assert_eq!(find("results/athena/laptop/sod/c5").message, "no result.json");
        assert!(has_errors(&issues));
    }

    #[cfg(unix)]
    #[test]
    fn test_unusable_directory_name_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let r = root.path();
        write(r, "results/athena/code.json", "{}");
        write(r, "results/athena/laptop/machine.json", "{}");
        write(
            r,
            "results/athena/laptop/sod/bad\\name/result.json",
            r#"{"runtime": 1, "date": "2024-05-01"}"#,
        );

        let issues = check_repository(&Layout::new(r), &catalogue()).unwrap();
        assert_eq!(issues.len(), 1, "{issues:?}");
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].path, "results/athena/laptop/sod/bad\\name");
        assert!(issues[0].message.starts_with("skipped by the build: "));
        assert!(issues[0].message.contains("commit must be a single path component"));
        assert!(has_errors(&issues));
    }

    #[test]
    fn test_issue_display() {
        let issue = Issue {
            severity: Severity::Error,
            path: "results/a/b/c/d/result.json".into(),
            message: "is not a JSON object".into(),
        };
        assert_eq!(
            issue.to_string(),
            "error: results/a/b/c/d/result.json: is not a JSON object"
        );
    }
}
