// Copyright 2026 AstroBenchmarks Contributors
// SPDX-License-Identifier: Apache-2.0

//! User configuration, read from `astrobench.toml` at the repository root.
//!
//! Every key is optional:
//!
//! ```toml
//! results_dir = "results"
//! benchmarks_dir = "benchmarks"
//! html_dir = "html"
//! logo = "astro_benchmarks.png"
//! site_title = "AstroBenchmarks"
//! python = "python3"
//! plots = true
//! ```

use crate::layout::{Layout, BENCHMARKS_DIR, HTML_DIR, LOGO_FILE, RESULTS_DIR};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the configuration file looked up in the repository root.
pub const SETTINGS_FILE: &str = "astrobench.toml";

/// Configurable values, with defaults for anything not set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Results directory, relative to the root
    pub results_dir: PathBuf,
    /// Benchmark definitions directory, relative to the root
    pub benchmarks_dir: PathBuf,
    /// Output directory, relative to the root
    pub html_dir: PathBuf,
    /// Logo copied into the site
    pub logo: PathBuf,
    /// Title shown in the page header
    pub site_title: String,
    /// Interpreter used to run `plot.py` hooks
    pub python: String,
    /// Whether plot hooks run at all
    pub plots: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from(RESULTS_DIR),
            benchmarks_dir: PathBuf::from(BENCHMARKS_DIR),
            html_dir: PathBuf::from(HTML_DIR),
            logo: PathBuf::from(LOGO_FILE),
            site_title: "AstroBenchmarks".to_string(),
            python: "python3".to_string(),
            plots: true,
        }
    }
}

impl Settings {
    /// Load `astrobench.toml` from `root`, falling back to defaults when absent.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let path = root.as_ref().join(SETTINGS_FILE);
        if !path.is_file() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let settings = Self::from_toml(&text).map_err(|source| Error::Toml {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Resolve the repository layout under `root`.
    pub fn layout(&self, root: impl Into<PathBuf>) -> Layout {
        let base = Layout::new(root);
        Layout {
            results_dir: base.resolve(&self.results_dir),
            benchmarks_dir: base.resolve(&self.benchmarks_dir),
            html_dir: base.resolve(&self.html_dir),
            logo: base.resolve(&self.logo),
            root: base.root,
        }
    }
}
