//! Plot hooks.
//!
//! Benchmarks with `data_file: true` may ship a `plot.py` that turns a
//! result's `data.h5` into `result.png`. How the hook is executed is up to a
//! [`PlotRenderer`]; this module decides when to call it and where the image
//! goes.

use crate::meta::BenchmarkMeta;
use astrobench_core::layout::{to_posix, DATA_FILE};
use astrobench_core::{Layout, Result, ResultLocation};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of a rendered plot.
pub const PLOT_FILE: &str = "result.png";

/// Inputs for one plot hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotRequest {
    /// Benchmark id
    pub benchmark: String,
    /// The benchmark's `plot.py`
    pub script: PathBuf,
    /// Commit directory holding `data.h5`
    pub input_dir: PathBuf,
    /// Directory `result.png` must be written to
    pub output_dir: PathBuf,
}

/// Executes plot hooks.
pub trait PlotRenderer {
    /// Render `result.png` into `request.output_dir`.
    fn render(&self, request: &PlotRequest) -> Result<()>;
}

/// Renderer that never produces plots.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlots;

impl PlotRenderer for NoPlots {
    fn render(&self, _request: &PlotRequest) -> Result<()> {
        Ok(())
    }
}

/// Produce (or reuse) the plot for one result.
///
/// Returns the image path relative to the output directory, or `None` when the
/// benchmark has no hook, the result has no data, or rendering failed.
pub fn ensure_plot(
    layout: &Layout,
    meta: &BenchmarkMeta,
    location: &ResultLocation,
    renderer: &dyn PlotRenderer,
) -> Option<String> {
    let script = meta.plot_script.as_ref()?;
    let input_dir = layout.commit_dir(location);
    let data = input_dir.join(DATA_FILE);
    if !data.is_file() {
        return None;
    }

    let output_dir = layout.plot_dir(location);
    let png = output_dir.join(PLOT_FILE);
    let relative = || {
        png.strip_prefix(&layout.html_dir)
            .map(to_posix)
            .unwrap_or_else(|_| to_posix(&png))
    };

    if is_newer(&png, &data) {
        debug!(plot = %png.display(), "plot is up to date");
        return Some(relative());
    }

    if let Err(e) = fs::create_dir_all(&output_dir) {
        warn!(dir = %output_dir.display(), error = %e, "cannot create plot directory");
        return None;
    }

    let request = PlotRequest {
        benchmark: meta.id.clone(),
        script: script.clone(),
        input_dir,
        output_dir,
    };
    if let Err(e) = renderer.render(&request) {
        warn!(input = %request.input_dir.display(), error = %e, "failed to generate plot");
        return None;
    }

    png.is_file().then(relative)
}

fn is_newer(path: &Path, than: &Path) -> bool {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
    match (modified(path), modified(than)) {
        (Some(a), Some(b)) => a > b,
        _ => false,
    }
}
