// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! End-to-end intake: paste, analyze, materialize, run again.

use std::fs;
use std::path::{Path, PathBuf};

use takein::intake::{analyze_with_date, FileCount};
use takein::report::render_plan;
use takein::{materialize, IntakeConfig, IntakeSession, Method, SessionState};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        Self { _dir: dir, root }
    }

    fn write(&self, rel: &str, body: &[u8]) -> PathBuf {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        path
    }

    fn config(&self) -> IntakeConfig {
        IntakeConfig {
            path_separators: "/".to_string(),
            path_keys: "... SHOW _ NAME".to_string(),
            name_separators: ". _".to_string(),
            name_keys: "SEQ SHOT ...".to_string(),
            destination: format!("{}/shows/${{SHOW}}/${{SEQ}}/${{SHOT}}/in_${{DATE}}", self.root.display()),
        }
    }

    fn out(&self, rel: &str) -> PathBuf {
        self.root.join("shows").join(rel)
    }
}

fn paste(paths: &[&Path]) -> String {
    let mut text = String::from("Delivery notes for today:\r\n");
    for path in paths {
        text.push_str(&format!("file://{}\r\n", path.display()));
    }
    text
}

#[test]
fn test_link_run_is_idempotent() {
    let fx = Fixture::new();
    let plate = fx.write("vendor/demo/plates/ep01_sh010.exr", b"plate");
    let edit = fx.write("vendor/demo/plates/ep01_sh020.mov", b"edit");
    let text = paste(&[&plate, &edit]);

    let plan = analyze_with_date(&text, &fx.config(), "261019").unwrap();
    assert_eq!(plan.groups.len(), 2);

    let first = materialize(&plan, Method::Link).unwrap();
    assert_eq!(first.created_count(), 2);

    let linked = fx.out("demo/ep01/sh010/in_261019/ep01_sh010.exr");
    assert_eq!(fs::read(&linked).unwrap(), b"plate");

    // local edits to a materialized file survive a second run
    fs::remove_file(&linked).unwrap();
    fs::write(&linked, b"touched").unwrap();

    let second = materialize(&plan, Method::Link).unwrap();
    assert_eq!(second.created_count(), 0);
    assert_eq!(second.skipped_count(), 2);
    assert_eq!(fs::read(&linked).unwrap(), b"touched");
}

#[test]
fn test_directory_source_preserves_structure() {
    let fx = Fixture::new();
    fx.write("vendor/demo/renders/ep03_sh040/beauty/f.0001.exr", b"1");
    fx.write("vendor/demo/renders/ep03_sh040/beauty/f.0002.exr", b"2");
    fx.write("vendor/demo/renders/ep03_sh040/matte/m.0001.exr", b"m");
    let dir = fx.root.join("vendor/demo/renders/ep03_sh040");

    let plan = analyze_with_date(&paste(&[&dir]), &fx.config(), "261019").unwrap();
    let source = plan.sources().next().unwrap();
    assert!(source.is_dir);
    assert_eq!(source.file_count, Some(FileCount::Exact(3)));
    assert!(render_plan(&plan).contains("(directory, containing 3 files)"));

    materialize(&plan, Method::Copy).unwrap();
    let base = fx.out("demo/ep03/sh040/in_261019/ep03_sh040");
    assert_eq!(fs::read(base.join("beauty/f.0001.exr")).unwrap(), b"1");
    assert_eq!(fs::read(base.join("beauty/f.0002.exr")).unwrap(), b"2");
    assert_eq!(fs::read(base.join("matte/m.0001.exr")).unwrap(), b"m");
}

#[test]
fn test_mixed_batch_through_session() {
    let fx = Fixture::new();
    let good = fx.write("vendor/demo/plates/ep01_sh010.exr", b"a");
    let unnamed = fx.write("vendor/demo/plates/readme", b"b");
    let missing = fx.root.join("vendor/demo/plates/ep09_sh999.exr");
    let text = paste(&[&good, &unnamed, &missing]);

    let mut session = IntakeSession::new();
    let plan = session.analyze_with_date(&text, &fx.config(), "261019").unwrap().clone();
    assert_eq!(plan.not_found, vec![missing.display().to_string()]);
    assert_eq!(plan.invalid.len(), 1);
    assert_eq!(plan.invalid[0].path, unnamed.display().to_string());
    assert_eq!(plan.source_count(), 1);

    let report = session.materialize(Method::Link).unwrap();
    assert_eq!(report.created_count(), 1);
    assert_eq!(session.state(), SessionState::Done);

    // a new batch only after accepting the previous one
    session.finish();
    session.analyze_with_date(&text, &fx.config(), "261020").unwrap();
    assert_eq!(session.state(), SessionState::Analyzed);
}
