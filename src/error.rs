// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for Takein

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Takein operations
pub type Result<T> = std::result::Result<T, TakeinError>;

/// Takein error types
#[derive(Error, Debug)]
pub enum TakeinError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("multiple key divider (...) is not allowed")]
    MultipleDividers,

    #[error("too many values for keys: {0}")]
    TooManyValues(String),

    #[error("not enough values for keys: {0}")]
    NotEnoughValues(String),

    #[error("unknown environ variable in dest: ${0}")]
    UnknownVariable(String),

    #[error("not an absolute path: {0}")]
    RelativeSource(String),

    #[error("{source}: {}", path.display())]
    Path {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("make dirs: {source}: {}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{method} file: {source}: {}", path.display())]
    Transfer {
        method: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("paths not analyzed yet")]
    NotAnalyzed,

    #[error("a batch is already in progress; revert or finish it first")]
    BatchInProgress,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TakeinError {
    /// Wrap an I/O error with the path it happened on
    pub fn at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Path {
            path: path.into(),
            source,
        }
    }

    /// Whether this error only invalidates a single source path.
    ///
    /// Tokenization and resolution failures are recorded against the path and
    /// the batch continues; everything else aborts the whole operation.
    pub fn is_per_path(&self) -> bool {
        matches!(
            self,
            Self::MultipleDividers
                | Self::TooManyValues(_)
                | Self::NotEnoughValues(_)
                | Self::UnknownVariable(_)
                | Self::RelativeSource(_)
        )
    }
}
