// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Linking or copying an analyzed plan into place
//!
//! Directory sources are materialized file by file rather than as a single
//! entry, so deleting inside the materialized tree never removes anything
//! from the source tree. Existing destination files are never overwritten.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::intake::{DestinationGroup, IntakePlan};
use crate::{Result, TakeinError};

/// How a source file reaches its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Hard link to the source
    #[default]
    Link,
    /// Full byte copy
    Copy,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Link => "link",
            Method::Copy => "copy",
        }
    }

    /// Create `dest` from `src`. Fails with `AlreadyExists` rather than
    /// replacing anything at `dest`.
    fn apply(&self, src: &Path, dest: &Path) -> std::io::Result<()> {
        match self {
            Method::Link => std::fs::hard_link(src, dest),
            Method::Copy => {
                let mut reader = File::open(src)?;
                let mut writer = OpenOptions::new().write(true).create_new(true).open(dest)?;
                io::copy(&mut reader, &mut writer)?;
                Ok(())
            }
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = TakeinError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "link" => Ok(Method::Link),
            "copy" => Ok(Method::Copy),
            other => Err(TakeinError::Config(format!("unknown method: {}", other))),
        }
    }
}

/// What happened under one destination directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedGroup {
    pub destination: String,
    /// Files newly linked or copied
    pub created: Vec<PathBuf>,
    /// Files left alone because something already existed there
    pub skipped: Vec<PathBuf>,
}

/// Outcome of materializing a whole plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializationReport {
    pub method: Method,
    pub groups: Vec<MaterializedGroup>,
}

impl MaterializationReport {
    pub fn created_count(&self) -> usize {
        self.groups.iter().map(|g| g.created.len()).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.groups.iter().map(|g| g.skipped.len()).sum()
    }
}

/// Pair each file under a group's sources with its path relative to the
/// destination directory.
///
/// A plain file maps to its own name. Files inside a directory source map
/// relative to the directory's parent, keeping the directory name as the
/// leading segment.
pub fn transfer_pairs(group: &DestinationGroup) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut pairs = Vec::new();
    for source in &group.sources {
        let src = source.path.as_path();
        if !source.is_dir {
            let name = src.file_name().map(PathBuf::from).unwrap_or_default();
            pairs.push((src.to_path_buf(), name));
            continue;
        }

        let base = src.parent().unwrap_or(src);
        for entry in WalkDir::new(src).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }
            let sub = entry
                .path()
                .strip_prefix(base)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| PathBuf::from(entry.file_name()));
            pairs.push((entry.into_path(), sub));
        }
    }
    Ok(pairs)
}

/// Link or copy every source in `plan` under its destination directory.
///
/// Stops at the first failure; anything already materialized stays.
///
/// This works on any plan value and does not check where the batch is in its
/// lifecycle. Use [`IntakeSession::materialize`](crate::IntakeSession::materialize)
/// to require an analyzed batch. Calling this again on the same plan only
/// fills in what is missing.
pub fn materialize(plan: &IntakePlan, method: Method) -> Result<MaterializationReport> {
    let mut report = MaterializationReport {
        method,
        groups: Vec::with_capacity(plan.groups.len()),
    };

    for (dest_dir, group) in &plan.groups {
        let mut done = MaterializedGroup {
            destination: dest_dir.clone(),
            ..MaterializedGroup::default()
        };

        for (src, sub) in transfer_pairs(group)? {
            let dest = Path::new(dest_dir).join(&sub);
            if place(&src, &dest, method)? {
                debug!("{} {} -> {}", method, src.display(), dest.display());
                done.created.push(sub);
            } else {
                debug!("Already exists, skipping: {}", dest.display());
                done.skipped.push(sub);
            }
        }
        report.groups.push(done);
    }

    info!(
        "Materialized by {}: {} created, {} skipped",
        method,
        report.created_count(),
        report.skipped_count()
    );

    Ok(report)
}

/// Put one file in place. Returns `false` when the destination was already taken.
fn place(src: &Path, dest: &Path, method: Method) -> Result<bool> {
    if let Some(parent) = dest.parent() {
        match std::fs::metadata(parent) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                std::fs::create_dir_all(parent).map_err(|source| TakeinError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            Err(e) => return Err(TakeinError::at(parent, e)),
        }
    }

    match std::fs::symlink_metadata(dest) {
        Ok(_) => return Ok(false),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(TakeinError::at(src, e)),
    }

    // something may appear at dest after the check above
    match method.apply(src, dest) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(source) => Err(TakeinError::Transfer {
            method: method.as_str(),
            path: src.to_path_buf(),
            source,
        }),
    }
}
