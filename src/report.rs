// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Plain-text rendering of plans and materialization reports

use std::fmt::Write;
use std::path::Path;

use crate::intake::{IntakePlan, SourceEntry};
use crate::materialize::MaterializationReport;

/// Render an analyzed plan, destinations and sources in sorted order
pub fn render_plan(plan: &IntakePlan) -> String {
    let mut out = String::new();

    if !plan.not_found.is_empty() {
        out.push_str("Not Exists\n");
        for path in &plan.not_found {
            let _ = writeln!(out, "{}", path);
        }
        out.push('\n');
    }

    if !plan.invalid.is_empty() {
        out.push_str("Invalids\n");
        for invalid in &plan.invalid {
            let _ = writeln!(out, "{} ({})", invalid.path, invalid.reason);
        }
        out.push('\n');
    }

    for (dest, group) in &plan.groups {
        let _ = write!(out, "To: {}", dest);
        if !group.exists {
            out.push_str(" (to be created)");
        }
        out.push('\n');
        for source in &group.sources {
            out.push_str(&source_line(source));
            out.push('\n');
        }
        out.push('\n');
    }

    out
}

fn source_line(source: &SourceEntry) -> String {
    let path = source.path.display();
    match source.file_count {
        Some(count) if source.is_dir => {
            let plural = if count.is_plural() { "s" } else { "" };
            format!("{} (directory, containing {} file{})", path, count, plural)
        }
        _ => path.to_string(),
    }
}

/// Render the outcome of a materialization run
pub fn render_materialization(report: &MaterializationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Done: {} ({} created, {} skipped)\n",
        report.method,
        report.created_count(),
        report.skipped_count()
    );

    for group in &report.groups {
        let _ = writeln!(out, "To: {}", group.destination);
        let dest = Path::new(&group.destination);
        for sub in &group.created {
            let _ = writeln!(out, "{}", dest.join(sub).display());
        }
        for sub in &group.skipped {
            let _ = writeln!(out, "{} (already exists)", dest.join(sub).display());
        }
        out.push('\n');
    }

    out
}
