// Copyright 2026 AstroBenchmarks Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared foundation for the AstroBenchmarks leaderboard compiler.
//!
//! # Modules
//!
//! - [`layout`] - Repository layout and the `results/<code>/<machine>/<benchmark>/<commit>` convention
//! - [`settings`] - `astrobench.toml` configuration
//! - [`error`] - The shared error type
//! - [`telemetry`] - Tracing subscriber setup

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod layout;
pub mod settings;
pub mod telemetry;

pub use error::{Error, Result};
pub use layout::{Layout, ResultLocation};
pub use settings::Settings;
