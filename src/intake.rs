// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Intake analysis
//!
//! Turns pasted text into an [`IntakePlan`]: which paths are missing, which
//! could not be resolved to a destination, and which sources go where.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::IntakeConfig;
use crate::destination;
use crate::materialize::{self, MaterializationReport, Method};
use crate::tokenizer::{Environment, TokenRule};
use crate::{Result, TakeinError};

/// Directories holding more files than this are not counted exactly
pub const FILE_COUNT_LIMIT: usize = 1000;

/// Prefix stripped from pasted file-manager URIs
const FILE_URI_PREFIX: &str = "file://";

/// Key injected into every environment with the run's date stamp
pub const DATE_KEY: &str = "DATE";

/// Number of files inside a directory source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCount {
    Exact(usize),
    /// More than [`FILE_COUNT_LIMIT`]; counting stopped early
    OverLimit,
}

impl FileCount {
    pub fn is_plural(&self) -> bool {
        !matches!(self, FileCount::Exact(0) | FileCount::Exact(1))
    }
}

impl fmt::Display for FileCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileCount::Exact(n) => write!(f, "{}", n),
            FileCount::OverLimit => write!(f, "{}+", FILE_COUNT_LIMIT),
        }
    }
}

/// An existing source that resolved to a destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub is_dir: bool,
    /// Only set for directories
    pub file_count: Option<FileCount>,
}

/// All sources resolving to one destination directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationGroup {
    pub destination: String,
    /// Whether the directory already existed at analysis time
    pub exists: bool,
    pub sources: Vec<SourceEntry>,
}

/// A source that exists but could not be given a destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidSource {
    pub path: String,
    pub reason: String,
}

/// Result of analyzing one batch of pasted paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakePlan {
    /// Date stamp injected as `$DATE`
    pub date: String,
    pub not_found: Vec<String>,
    pub invalid: Vec<InvalidSource>,
    /// Keyed and ordered by destination directory
    pub groups: BTreeMap<String, DestinationGroup>,
}

impl IntakePlan {
    /// Number of sources that will be materialized
    pub fn source_count(&self) -> usize {
        self.groups.values().map(|g| g.sources.len()).sum()
    }

    /// Every grouped source, in destination then path order
    pub fn sources(&self) -> impl Iterator<Item = &SourceEntry> {
        self.groups.values().flat_map(|g| g.sources.iter())
    }

    /// Whether there is nothing to materialize
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Today's date stamp in the `YYMMDD` form used for `$DATE`
pub fn date_stamp() -> String {
    Local::now().format("%y%m%d").to_string()
}

/// Pull candidate absolute paths out of free-form text.
///
/// A line counts when, after dropping an optional `file://` prefix, it starts
/// with `/`. Other lines are ignored outright.
pub fn extract_candidates(raw: &str) -> Vec<&str> {
    raw.lines()
        .map(|line| line.strip_prefix(FILE_URI_PREFIX).unwrap_or(line))
        .filter(|line| line.starts_with('/'))
        .collect()
}

/// Merged path and name environment for a single source path
pub fn environment_for(source: &str, config: &IntakeConfig) -> Result<Environment> {
    merged_environment(source, &config.path_rule(), &config.name_rule())
}

/// Name-pass values win over path-pass values for the same key.
fn merged_environment(source: &str, path_rule: &TokenRule, name_rule: &TokenRule) -> Result<Environment> {
    let mut env = path_rule.tokenize(source)?;
    env.extend(name_rule.tokenize(base_name(source))?);
    Ok(env)
}

/// Last `/`-separated segment of `path`, ignoring trailing slashes.
///
/// Unlike `Path::file_name`, `..` and `.` come back as themselves; an
/// all-slash path gives `/`.
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.is_empty() { "." } else { "/" };
    }
    match trimmed.rfind('/') {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}

/// Destination of the first candidate in `raw`, without touching the filesystem.
///
/// `Ok(None)` means the text holds no candidate path.
pub fn preview_destination(raw: &str, config: &IntakeConfig, date: &str) -> Result<Option<(String, String)>> {
    let Some(sample) = extract_candidates(raw).into_iter().next() else {
        return Ok(None);
    };
    let sample = sample.trim();
    let mut env = environment_for(sample, config)?;
    env.insert(DATE_KEY.to_string(), date.to_string());
    let dest = destination::resolve(sample, &config.destination, &env)?;
    Ok(Some((sample.to_string(), dest)))
}

/// Analyze a batch, stamping `$DATE` with today's date
pub fn analyze(raw: &str, config: &IntakeConfig) -> Result<IntakePlan> {
    analyze_with_date(raw, config, &date_stamp())
}

/// Analyze a batch of pasted paths.
///
/// Missing paths and paths that fail tokenization or resolution are recorded
/// in the plan; any other filesystem error aborts the analysis.
pub fn analyze_with_date(raw: &str, config: &IntakeConfig, date: &str) -> Result<IntakePlan> {
    let mut plan = IntakePlan {
        date: date.to_string(),
        ..IntakePlan::default()
    };

    let mut existing: Vec<(String, bool)> = Vec::new();
    for candidate in extract_candidates(raw) {
        let src = candidate.trim();
        match std::fs::metadata(src) {
            Ok(meta) => existing.push((src.to_string(), meta.is_dir())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Not found: {}", src);
                plan.not_found.push(src.to_string());
            }
            Err(e) => return Err(TakeinError::at(src, e)),
        }
    }
    existing.sort();
    existing.dedup();

    info!("Analyzing {} existing path(s), {} not found", existing.len(), plan.not_found.len());

    let path_rule = config.path_rule();
    let name_rule = config.name_rule();
    let mut dest_exists: BTreeMap<String, bool> = BTreeMap::new();

    for (src, is_dir) in existing {
        let resolved = merged_environment(&src, &path_rule, &name_rule).and_then(|mut env| {
            env.insert(DATE_KEY.to_string(), date.to_string());
            destination::resolve(&src, &config.destination, &env)
        });

        let dest = match resolved {
            Ok(dest) => dest,
            Err(e) if e.is_per_path() => {
                warn!("Invalid: {} ({})", src, e);
                plan.invalid.push(InvalidSource {
                    path: src,
                    reason: e.to_string(),
                });
                continue;
            }
            Err(e) => return Err(e),
        };

        let file_count = if is_dir {
            Some(count_files(Path::new(&src))?)
        } else {
            None
        };

        let exists = match dest_exists.entry(dest.clone()) {
            Entry::Occupied(cached) => *cached.get(),
            Entry::Vacant(slot) => *slot.insert(directory_exists(&dest)?),
        };

        debug!("{} -> {}", src, dest);
        plan.groups
            .entry(dest.clone())
            .or_insert_with(|| DestinationGroup {
                destination: dest,
                exists,
                sources: Vec::new(),
            })
            .sources
            .push(SourceEntry {
                path: PathBuf::from(src),
                is_dir,
                file_count,
            });
    }

    info!(
        "Planned {} source(s) into {} destination(s), {} invalid",
        plan.source_count(),
        plan.groups.len(),
        plan.invalid.len()
    );

    Ok(plan)
}

/// Count non-directory entries under `dir`, giving up past [`FILE_COUNT_LIMIT`].
///
/// The limit is global to the walk, not per sub-directory.
pub fn count_files(dir: &Path) -> Result<FileCount> {
    let mut count = 0;
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        count += 1;
        if count > FILE_COUNT_LIMIT {
            return Ok(FileCount::OverLimit);
        }
    }
    Ok(FileCount::Exact(count))
}

fn directory_exists(dest: &str) -> Result<bool> {
    match std::fs::metadata(dest) {
        Ok(_) => {
            debug!("Destination exists: {}", dest);
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Destination to be created: {}", dest);
            Ok(false)
        }
        Err(e) => Err(TakeinError::at(dest, e)),
    }
}

/// Where a batch is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Ready to accept a new batch
    Idle,
    /// A plan exists and may be materialized or reverted
    Analyzed,
    /// The plan was materialized
    Done,
}

/// Holds at most one live batch and enforces its transitions.
///
/// Idle -> Analyzed -> (revert) Idle, or -> (materialize) Done -> (finish) Idle.
#[derive(Debug)]
pub struct IntakeSession {
    state: SessionState,
    plan: Option<IntakePlan>,
}

impl Default for IntakeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            plan: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The current plan, if one has been analyzed
    pub fn plan(&self) -> Option<&IntakePlan> {
        self.plan.as_ref()
    }

    /// Analyze a new batch; only allowed while idle
    pub fn analyze(&mut self, raw: &str, config: &IntakeConfig) -> Result<&IntakePlan> {
        self.analyze_with_date(raw, config, &date_stamp())
    }

    pub fn analyze_with_date(&mut self, raw: &str, config: &IntakeConfig, date: &str) -> Result<&IntakePlan> {
        if self.state != SessionState::Idle {
            return Err(TakeinError::BatchInProgress);
        }
        let plan = analyze_with_date(raw, config, date)?;
        self.state = SessionState::Analyzed;
        Ok(self.plan.insert(plan))
    }

    /// Drop the analyzed plan so the input can be edited and analyzed again
    pub fn revert(&mut self) -> Result<()> {
        if self.state != SessionState::Analyzed {
            return Err(TakeinError::NotAnalyzed);
        }
        self.plan = None;
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Materialize the analyzed plan.
    ///
    /// On failure the session stays analyzed so the run can be retried.
    pub fn materialize(&mut self, method: Method) -> Result<MaterializationReport> {
        let plan = match (self.state, self.plan.as_ref()) {
            (SessionState::Analyzed, Some(plan)) => plan,
            _ => return Err(TakeinError::NotAnalyzed),
        };
        let report = materialize::materialize(plan, method)?;
        self.state = SessionState::Done;
        Ok(report)
    }

    /// Accept the result and get ready for a new batch
    pub fn finish(&mut self) {
        self.plan = None;
        self.state = SessionState::Idle;
    }
}
