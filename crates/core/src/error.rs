// Copyright 2026 AstroBenchmarks Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error type shared by the AstroBenchmarks crates.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading a benchmark repository or writing the site.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem operation failed
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or produced
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// Offending file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The configuration file could not be parsed
    #[error("invalid configuration in {path}: {source}")]
    Toml {
        /// Offending file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// Caller supplied something that does not follow repository conventions
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A plot hook failed
    #[error("plot generation failed: {0}")]
    Plot(String),
}

impl Error {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wrap a JSON error with the file it concerns.
    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build an [`Error::InvalidInput`].
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build an [`Error::Plot`].
    pub fn plot(msg: impl Into<String>) -> Self {
        Self::Plot(msg.into())
    }
}

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;
