//! I/O for the leaderboard.
//!
//! Reading helpers used while scanning the repository, and writers for the
//! generated site (`index.html`, `summary.md`, `leaderboard.json`).

use crate::html::render_html;
use crate::markdown::generate_summary;
use crate::rank::Leaderboard;
use astrobench_core::{Error, Layout, Result, Settings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// HTML page file name.
pub const INDEX_FILE: &str = "index.html";

/// Markdown summary file name.
pub const SUMMARY_FILE: &str = "summary.md";

/// Machine-readable leaderboard file name.
pub const JSON_FILE: &str = "leaderboard.json";

/// Which artifacts to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `index.html` only
    Html,
    /// `summary.md` only
    Markdown,
    /// `leaderboard.json` only
    Json,
    /// Everything
    All,
}

impl OutputFormat {
    fn html(self) -> bool {
        matches!(self, Self::Html | Self::All)
    }

    fn markdown(self) -> bool {
        matches!(self, Self::Markdown | Self::All)
    }

    fn json(self) -> bool {
        matches!(self, Self::Json | Self::All)
    }
}

/// Read and parse a JSON file.
pub fn read_json(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| Error::json(path, e))
}

/// Read a JSON file, treating any failure as absence.
///
/// Missing files are silent; unreadable or malformed ones are logged.
pub fn read_json_lenient(path: impl AsRef<Path>) -> Option<Value> {
    let path = path.as_ref();
    if !path.exists() {
        return None;
    }
    match read_json(path) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "skipping unreadable JSON file");
            None
        }
    }
}

/// Immediate subdirectories of `dir`, sorted by name.
///
/// A missing directory has no subdirectories.
pub fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    fs::write(path, contents).map_err(|e| Error::io(path, e))
}

/// Write the leaderboard as pretty JSON.
pub fn write_leaderboard_json(board: &Leaderboard, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(board).map_err(|e| Error::json(path, e))?;
    write_file(path, json)
}

/// Write the generated site into `html_dir`.
///
/// Returns the paths written, logo included.
pub fn write_site(
    layout: &Layout,
    board: &Leaderboard,
    format: OutputFormat,
    generated_at: DateTime<Utc>,
    settings: &Settings,
) -> Result<Vec<PathBuf>> {
    let html_dir = layout.html_dir.as_path();
    let logo = layout.logo.as_path();
    fs::create_dir_all(html_dir).map_err(|e| Error::io(html_dir, e))?;
    let mut written = Vec::new();

    if format.html() {
        let path = html_dir.join(INDEX_FILE);
        write_file(&path, render_html(board, generated_at, settings))?;
        info!(path = %path.display(), "wrote leaderboard page");
        written.push(path);
    }

    if format.markdown() {
        let path = html_dir.join(SUMMARY_FILE);
        write_file(&path, generate_summary(board, generated_at))?;
        info!(path = %path.display(), "wrote markdown summary");
        written.push(path);
    }

    if format.json() {
        let path = html_dir.join(JSON_FILE);
        write_leaderboard_json(board, &path)?;
        info!(path = %path.display(), "wrote leaderboard JSON");
        written.push(path);
    }

    if format.html() {
        if logo.is_file() {
            let name = logo.file_name().unwrap_or_default();
            let dest = html_dir.join(name);
            fs::copy(logo, &dest).map_err(|e| Error::io(&dest, e))?;
            info!(path = %dest.display(), "copied logo");
            written.push(dest);
        } else {
            warn!(path = %logo.display(), "logo not found");
        }
    }

    Ok(written)
}

/// Read a leaderboard previously written by [`write_leaderboard_json`].
pub fn read_leaderboard_json(path: impl AsRef<Path>) -> Result<Leaderboard> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| Error::json(path, e))
}
