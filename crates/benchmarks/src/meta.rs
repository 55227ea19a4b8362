//! Benchmark catalogue.
//!
//! Each directory under `benchmarks/` defines one benchmark. Its optional
//! `info.json` describes how it is presented and ranked, and its optional
//! `template.json` fixes the result keys (and their column order).

use crate::io::{read_json_lenient, sorted_subdirs};
use astrobench_core::{Layout, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Key that is shown as a link and never used for ordering.
pub const SETUP_KEY: &str = "setup";

/// Ranking direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    /// Smallest value ranks first.
    #[default]
    Asc,
    /// Largest value ranks first.
    Desc,
}

impl SortDir {
    /// Parse `asc`/`desc` case-insensitively. Anything else is ascending.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            SortDir::Desc
        } else {
            SortDir::Asc
        }
    }

    /// Whether this is [`SortDir::Asc`].
    pub fn is_asc(self) -> bool {
        self == SortDir::Asc
    }
}

/// Fields of `info.json`, each read on its own.
///
/// A field of the wrong type falls back to its default without touching the
/// others.
#[derive(Debug, Default)]
struct InfoFile {
    name: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    sort_by: Option<String>,
    sort_dir: Option<String>,
    data_file: bool,
}

impl InfoFile {
    fn from_map(id: &str, info: &Map<String, Value>) -> Self {
        let text = |key: &str| match info.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                warn!(benchmark = %id, key, value = %other, "info.json field is not a string, ignoring");
                None
            }
        };
        let tags = match info.get("tags") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|t| match t {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
            Some(other) => {
                warn!(benchmark = %id, value = %other, "info.json tags is not a list, ignoring");
                Vec::new()
            }
        };

        Self {
            name: text("name"),
            description: text("description"),
            tags,
            sort_by: text("sort_by"),
            sort_dir: text("sort_dir"),
            data_file: info.get("data_file").is_some_and(truthy),
        }
    }
}

/// JSON truthiness: `false`, `0`, `""`, `[]`, `{}` and `null` are false.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Everything known about one benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMeta {
    /// Directory name, used as the benchmark id
    pub id: String,
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Key the table is initially ranked by
    pub sort_by: Option<String>,
    /// Ranking direction
    pub sort_dir: SortDir,
    /// Whether results carry a `data.h5` to plot
    pub data_file: bool,
    /// README path relative to the repository root
    pub readme: Option<String>,
    /// Result keys from `template.json`, in file order
    pub template_keys: Vec<String>,
    /// Plot hook, when the benchmark has one
    #[serde(skip)]
    pub plot_script: Option<PathBuf>,
    /// Benchmark directory
    #[serde(skip)]
    pub dir: PathBuf,
}

impl BenchmarkMeta {
    /// Metadata for a benchmark with nothing but a directory.
    pub fn bare(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: String::new(),
            tags: Vec::new(),
            sort_by: None,
            sort_dir: SortDir::Asc,
            data_file: false,
            readme: None,
            template_keys: Vec::new(),
            plot_script: None,
            dir: PathBuf::new(),
        }
    }

    /// The key used for initial ranking, if any.
    ///
    /// `setup` holds links and is never ranked by.
    pub fn ranking_key(&self) -> Option<&str> {
        self.sort_by.as_deref().filter(|k| *k != SETUP_KEY)
    }
}

/// All benchmarks of a repository, keyed by id.
pub type Catalogue = BTreeMap<String, BenchmarkMeta>;

/// Read every benchmark definition under the benchmarks directory.
///
/// A missing directory gives an empty catalogue.
pub fn discover_benchmarks(layout: &Layout) -> Result<Catalogue> {
    let mut catalogue = Catalogue::new();
    for dir in sorted_subdirs(&layout.benchmarks_dir)? {
        let Some(id) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let meta = load_benchmark(layout, id.clone(), dir);
        debug!(benchmark = %id, keys = meta.template_keys.len(), "discovered benchmark");
        catalogue.insert(id, meta);
    }
    Ok(catalogue)
}

fn load_benchmark(layout: &Layout, id: String, dir: PathBuf) -> BenchmarkMeta {
    let info = match read_json_lenient(dir.join("info.json")) {
        Some(Value::Object(map)) => InfoFile::from_map(&id, &map),
        Some(_) => {
            warn!(benchmark = %id, "info.json is not an object, ignoring");
            InfoFile::default()
        }
        None => InfoFile::default(),
    };

    let template_keys = match read_json_lenient(dir.join("template.json")) {
        Some(Value::Object(map)) => map.keys().cloned().collect(),
        Some(_) => {
            warn!(benchmark = %id, "template.json is not an object");
            Vec::new()
        }
        None => Vec::new(),
    };

    let readme = dir.join("README.md");
    let plot_script = dir.join("plot.py");

    BenchmarkMeta {
        name: info.name.unwrap_or_else(|| id.clone()),
        description: info.description.unwrap_or_default(),
        tags: info.tags,
        sort_by: info.sort_by,
        sort_dir: info.sort_dir.as_deref().map(SortDir::parse).unwrap_or_default(),
        data_file: info.data_file,
        readme: readme.is_file().then(|| layout.relative(&readme)),
        template_keys,
        plot_script: plot_script.is_file().then_some(plot_script),
        id,
        dir,
    }
}
