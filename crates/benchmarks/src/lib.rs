//! Leaderboard compiler for AstroBenchmarks.
//!
//! This crate turns a benchmark repository (benchmark definitions under
//! `benchmarks/`, submissions under `results/<code>/<machine>/<benchmark>/<commit>/`)
//! into a ranked leaderboard and renders it.
//!
//! # Quick Start
//!
//! ```no_run
//! use astrobench_benchmarks::{build_leaderboard, plot::NoPlots};
//! use astrobench_core::Layout;
//!
//! let layout = Layout::new(".");
//! let board = build_leaderboard(&layout, &NoPlots)?;
//!
//! for b in &board.boards {
//!     println!("{}: {} results", b.meta.id, b.rows.len());
//! }
//! # Ok::<(), astrobench_core::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`meta`] - Benchmark catalogue (`info.json`, `template.json`)
//! - [`result`] - The `ResultRecord` type and `result.json` parsing
//! - [`discover`] - Walking the results tree
//! - [`plot`] - Plot hooks for benchmarks with raw data
//! - [`rank`] - Deduplication, ranking and totals
//! - [`html`] - The leaderboard page
//! - [`markdown`] - Markdown summary
//! - [`io`] - Reading inputs and writing the site
//! - [`check`] - Lint of the results tree
//! - [`scaffold`] - New submissions from templates

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod check;
pub mod discover;
pub mod html;
pub mod io;
pub mod markdown;
pub mod meta;
pub mod plot;
pub mod rank;
pub mod result;
pub mod scaffold;

pub use io::OutputFormat;
pub use meta::{BenchmarkMeta, Catalogue, SortDir};
pub use rank::Leaderboard;
pub use result::ResultRecord;

use astrobench_core::{Layout, Result, Settings};
use chrono::{DateTime, Utc};
use plot::PlotRenderer;
use std::path::PathBuf;

/// Discover benchmarks and results and rank them.
pub fn build_leaderboard(layout: &Layout, plots: &dyn PlotRenderer) -> Result<Leaderboard> {
    let catalogue = meta::discover_benchmarks(layout)?;
    let records = discover::discover_results(layout, &catalogue, plots)?;
    let codes: std::collections::BTreeSet<&str> = records.iter().map(|r| r.code.as_str()).collect();
    let code_urls = discover::load_code_urls(layout, codes);
    Ok(Leaderboard::compile(&catalogue, records, code_urls))
}

/// Build the leaderboard and write the site.
///
/// # Returns
///
/// The leaderboard and every path written.
///
/// # Errors
///
/// Fails when the repository cannot be listed or an output cannot be written.
/// Individual malformed submissions are skipped, not reported as errors.
pub fn build_and_write(
    layout: &Layout,
    settings: &Settings,
    plots: &dyn PlotRenderer,
    format: OutputFormat,
    generated_at: DateTime<Utc>,
) -> Result<(Leaderboard, Vec<PathBuf>)> {
    let board = build_leaderboard(layout, plots)?;
    let written = io::write_site(layout, &board, format, generated_at, settings)?;
    Ok((board, written))
}
