// Copyright 2026 AstroBenchmarks Contributors
// SPDX-License-Identifier: Apache-2.0

//! Python plot hook runner.
//!
//! A benchmark's `plot.py` defines `plot(input_dir, output_dir)`. The runner
//! imports the script as a module in a fresh interpreter and calls that
//! function, with the benchmark directory as working directory so relative
//! imports of helper files keep working.
//!
//! # Example
//!
//! ```no_run
//! use astrobench_adapters::python::PythonPlotter;
//! use astrobench_benchmarks::build_leaderboard;
//! use astrobench_core::Layout;
//!
//! let plotter = PythonPlotter::new("python3");
//! let board = build_leaderboard(&Layout::new("."), &plotter)?;
//! # Ok::<(), astrobench_core::Error>(())
//! ```

use astrobench_benchmarks::plot::{PlotRenderer, PlotRequest, PLOT_FILE};
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use thiserror::Error;
use tracing::debug;

/// Loads `sys.argv[1]` as a module and calls `plot(sys.argv[2], sys.argv[3])`.
const LOADER: &str = "import importlib.util, sys\n\
module_spec = importlib.util.spec_from_file_location('plot_module', sys.argv[1])\n\
module = importlib.util.module_from_spec(module_spec)\n\
module_spec.loader.exec_module(module)\n\
module.plot(sys.argv[2], sys.argv[3])\n";

/// Errors from running a plot hook.
#[derive(Debug, Error)]
pub enum PlotterError {
    /// The interpreter could not be started
    #[error("cannot run {python}: {source}")]
    Spawn {
        /// Interpreter command
        python: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The hook exited unsuccessfully
    #[error("plot.py for {benchmark} failed ({status}): {stderr}")]
    Failed {
        /// Benchmark id
        benchmark: String,
        /// Exit status
        status: ExitStatus,
        /// Captured standard error, trimmed
        stderr: String,
    },

    /// The hook succeeded without writing the image
    #[error("plot.py for {benchmark} did not write {}", .expected.display())]
    NoOutput {
        /// Benchmark id
        benchmark: String,
        /// Image the hook should have written
        expected: PathBuf,
    },
}

impl From<PlotterError> for astrobench_core::Error {
    fn from(err: PlotterError) -> Self {
        astrobench_core::Error::plot(err.to_string())
    }
}

/// Result type for plot hook runs.
pub type Result<T> = std::result::Result<T, PlotterError>;

/// Runs `plot.py` hooks with a Python interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonPlotter {
    python: String,
}

impl PythonPlotter {
    /// Use `python` (a command name or a path) as interpreter.
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// The interpreter command.
    pub fn python(&self) -> &str {
        &self.python
    }

    /// Run the hook for one request.
    pub fn run(&self, request: &PlotRequest) -> Result<()> {
        let workdir = request
            .script
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        debug!(
            benchmark = %request.benchmark,
            script = %request.script.display(),
            input = %request.input_dir.display(),
            "running plot hook"
        );

        let output = Command::new(&self.python)
            .arg("-c")
            .arg(LOADER)
            .arg(&request.script)
            .arg(&request.input_dir)
            .arg(&request.output_dir)
            .current_dir(workdir)
            .output()
            .map_err(|source| PlotterError::Spawn {
                python: self.python.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlotterError::Failed {
                benchmark: request.benchmark.clone(),
                status: output.status,
                stderr: stderr.trim().to_string(),
            });
        }

        let expected = request.output_dir.join(PLOT_FILE);
        if !expected.is_file() {
            return Err(PlotterError::NoOutput {
                benchmark: request.benchmark.clone(),
                expected,
            });
        }
        Ok(())
    }
}

impl Default for PythonPlotter {
    fn default() -> Self {
        Self::new("python3")
    }
}

impl PlotRenderer for PythonPlotter {
    fn render(&self, request: &PlotRequest) -> astrobench_core::Result<()> {
        self.run(request).map_err(Into::into)
    }
}
