// Copyright 2026 AstroBenchmarks Contributors
// SPDX-License-Identifier: Apache-2.0

//! Repository layout and the result path convention.
//!
//! A benchmark repository looks like this:
//!
//! ```text
//! <root>
//!   ├─ benchmarks/<benchmark>/{info.json, template.json, README.md, plot.py}
//!   ├─ results/<code>/code.json
//!   ├─ results/<code>/<machine>/machine.json
//!   ├─ results/<code>/<machine>/<benchmark>/<commit>/{result.json, data.h5}
//!   └─ html/                       (generated)
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Default results directory name.
pub const RESULTS_DIR: &str = "results";

/// Default benchmark definitions directory name.
pub const BENCHMARKS_DIR: &str = "benchmarks";

/// Default output directory name.
pub const HTML_DIR: &str = "html";

/// Default logo file name.
pub const LOGO_FILE: &str = "astro_benchmarks.png";

/// File name of a submitted result.
pub const RESULT_FILE: &str = "result.json";

/// File name of the raw data that plots are made from.
pub const DATA_FILE: &str = "data.h5";

/// Resolved locations of everything the compiler reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Repository root
    pub root: PathBuf,
    /// Submitted results
    pub results_dir: PathBuf,
    /// Benchmark definitions
    pub benchmarks_dir: PathBuf,
    /// Generated site
    pub html_dir: PathBuf,
    /// Logo copied into the site
    pub logo: PathBuf,
}

impl Layout {
    /// Layout with the default directory names under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            results_dir: root.join(RESULTS_DIR),
            benchmarks_dir: root.join(BENCHMARKS_DIR),
            html_dir: root.join(HTML_DIR),
            logo: root.join(LOGO_FILE),
            root,
        }
    }

    /// Replace the output directory.
    pub fn with_html_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.html_dir = self.resolve(dir);
        self
    }

    /// Resolve a possibly relative path against the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// `path` relative to the root, with `/` separators.
    ///
    /// Paths outside the root are returned unchanged.
    pub fn relative(&self, path: impl AsRef<Path>) -> String {
        let path = path.as_ref();
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        to_posix(rel)
    }

    /// Directory holding the results of one commit.
    pub fn commit_dir(&self, loc: &ResultLocation) -> PathBuf {
        self.results_dir.join(loc.relative_dir())
    }

    /// Directory a plot for `loc` is written to.
    pub fn plot_dir(&self, loc: &ResultLocation) -> PathBuf {
        self.html_dir.join("plots").join(loc.relative_dir())
    }
}

/// Join the normal components of a path with `/`.
pub fn to_posix(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Where a result lives: `results/<code>/<machine>/<benchmark>/<commit>/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultLocation {
    /// Simulation code name
    pub code: String,
    /// Machine the code ran on
    pub machine: String,
    /// Benchmark id
    pub benchmark: String,
    /// Commit (or any run label) of the code
    pub commit: String,
}

impl ResultLocation {
    /// Create a location, rejecting components that would escape the tree.
    pub fn new(
        code: impl Into<String>,
        machine: impl Into<String>,
        benchmark: impl Into<String>,
        commit: impl Into<String>,
    ) -> Result<Self> {
        let loc = Self {
            code: code.into(),
            machine: machine.into(),
            benchmark: benchmark.into(),
            commit: commit.into(),
        };
        for (name, value) in [
            ("code", &loc.code),
            ("machine", &loc.machine),
            ("benchmark", &loc.benchmark),
            ("commit", &loc.commit),
        ] {
            if value.is_empty()
                || value == "."
                || value == ".."
                || value.contains('/')
                || value.contains('\\')
            {
                return Err(Error::invalid_input(format!(
                    "{name} must be a single path component, got {value:?}"
                )));
            }
        }
        Ok(loc)
    }

    /// Parse a path relative to the results directory.
    ///
    /// Accepts `<code>/<machine>/<benchmark>/<commit>` with an optional
    /// trailing `result.json`.
    pub fn from_relative(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut parts: Vec<String> = path
            .components()
            .map(|c| match c {
                Component::Normal(s) => Ok(s.to_string_lossy().into_owned()),
                _ => Err(Error::invalid_input(format!(
                    "unexpected component in result path {}",
                    path.display()
                ))),
            })
            .collect::<Result<_>>()?;

        if parts.len() == 5 && parts[4] == RESULT_FILE {
            parts.pop();
        }
        match <[String; 4]>::try_from(parts) {
            Ok([code, machine, benchmark, commit]) => Self::new(code, machine, benchmark, commit),
            Err(_) => Err(Error::invalid_input(format!(
                "expected <code>/<machine>/<benchmark>/<commit>, got {}",
                path.display()
            ))),
        }
    }

    /// `<code>/<machine>/<benchmark>/<commit>` as a relative path.
    pub fn relative_dir(&self) -> PathBuf {
        [&self.code, &self.machine, &self.benchmark, &self.commit]
            .iter()
            .collect()
    }
}
