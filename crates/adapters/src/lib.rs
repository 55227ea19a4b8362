// Copyright 2026 AstroBenchmarks Contributors
// SPDX-License-Identifier: Apache-2.0

//! Integrations with tools outside the Rust build.
//!
//! The leaderboard compiler only knows the [`PlotRenderer`] seam; the
//! implementations that shell out to other programs live here.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod python;

use astrobench_benchmarks::plot::{NoPlots, PlotRenderer};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use super::plot_renderer;
    pub use super::python::{PlotterError, PythonPlotter};
}

pub use python::PythonPlotter;

/// Pick the plot renderer for a build.
///
/// With plots disabled every hook is skipped; otherwise hooks run with `python`.
pub fn plot_renderer(enabled: bool, python: &str) -> Box<dyn PlotRenderer> {
    if enabled {
        Box::new(PythonPlotter::new(python))
    } else {
        Box::new(NoPlots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astrobench_benchmarks::plot::PlotRequest;
    use std::path::PathBuf;

    fn request() -> PlotRequest {
        PlotRequest {
            benchmark: "ot".into(),
            script: PathBuf::from("benchmarks/ot/plot.py"),
            input_dir: PathBuf::from("results/a/b/ot/c"),
            output_dir: PathBuf::from("html/plots/a/b/ot/c"),
        }
    }

    #[test]
    fn test_disabled_renderer_is_a_no_op() {
        assert!(plot_renderer(false, "/definitely/not/a/python")
            .render(&request())
            .is_ok());
    }

    #[test]
    fn test_enabled_renderer_runs_interpreter() {
        assert!(plot_renderer(true, "/definitely/not/a/python")
            .render(&request())
            .is_err());
    }
}
