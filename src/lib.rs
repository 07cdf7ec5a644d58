// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Takein: path intake for show/shot pipelines
//!
//! Reads pasted file paths, infers metadata such as show, sequence and shot
//! from each path's text, works out a destination directory from a pattern,
//! and hard-links or copies the sources into place without ever overwriting.

pub mod config;
pub mod destination;
pub mod error;
pub mod intake;
pub mod materialize;
pub mod report;
pub mod tokenizer;

pub use config::IntakeConfig;
pub use error::{Result, TakeinError};
pub use intake::{analyze, IntakePlan, IntakeSession, SessionState};
pub use materialize::{materialize, MaterializationReport, Method};
