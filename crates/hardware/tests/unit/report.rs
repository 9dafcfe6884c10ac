//! Comparison Report Tests.
//!
//! Pairing validation, metric extraction, and loading summaries written by runs.

use std::fs;
use std::path::PathBuf;

use fsim_core::report::{Comparison, check_pairing, load_summary};
use fsim_core::{SimError, Summary};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use crate::common::harness::{ping_pong, run, with_fix};

fn summary(ipki: f64, ipc_proxy: f64) -> Summary {
    Summary {
        ipki,
        ipc_proxy,
        ..Summary::default()
    }
}

#[test]
fn pairs_rows_in_order_with_default_labels() {
    let base = [summary(10.0, 0.1), summary(4.0, 0.2)];
    let fix = [summary(2.0, 0.3), summary(4.0, 0.2)];
    let comparison = Comparison::new(&base, &fix, None).unwrap();

    let rows = comparison.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].label, "w0");
    assert_eq!(rows[1].label, "w1");
    assert!((rows[0].ipki_delta() + 8.0).abs() < 1e-9);
    assert!((rows[0].ipc_delta() - 0.2).abs() < 1e-9);
    assert!(rows[1].ipki_delta().abs() < 1e-9);
}

#[test]
fn mismatched_lists_rejected() {
    let err = Comparison::new(&[summary(1.0, 1.0), summary(1.0, 1.0)], &[summary(1.0, 1.0)], None).unwrap_err();
    assert!(matches!(err, SimError::Config(ref m) if m.contains("same length (2 vs 1)")));
}

#[test]
fn mismatched_labels_rejected() {
    let err = check_pairing(2, 2, Some(3)).unwrap_err();
    assert!(matches!(err, SimError::Config(ref m) if m.contains("labels length")));
    check_pairing(2, 2, Some(2)).unwrap();
    check_pairing(2, 2, None).unwrap();
}

/// Pairing is checked before any file is opened, so nonexistent paths still
/// produce the pairing error.
#[test]
fn pairing_checked_before_loading() {
    let base = vec![PathBuf::from("/nope/a.json"), PathBuf::from("/nope/b.json")];
    let fix = vec![PathBuf::from("/nope/c.json")];
    let err = Comparison::from_files(&base, &fix, None).unwrap_err();
    assert!(matches!(err, SimError::Config(_)));
}

#[test]
fn compares_persisted_runs() {
    let dir = tempdir().unwrap();
    let base_path = dir.path().join("base.json");
    let fix_path = dir.path().join("fix.json");
    let base = run(&ping_pong(3), &with_fix(false));
    let fix = run(&ping_pong(3), &with_fix(true));
    fs::write(&base_path, serde_json::to_string_pretty(&base).unwrap()).unwrap();
    fs::write(&fix_path, serde_json::to_string_pretty(&fix).unwrap()).unwrap();

    assert_eq!(load_summary(&base_path).unwrap(), base);

    let comparison = Comparison::from_files(&[base_path], &[fix_path], Some(vec!["pingpong".into()])).unwrap();
    let row = &comparison.rows()[0];
    assert_eq!(row.label, "pingpong");
    assert!(row.ipki_delta() < 0.0, "mitigation lowers invalidations");
    assert!(row.ipc_delta() > 0.0, "mitigation raises the IPC proxy");

    let table = comparison.render();
    assert!(table.starts_with("workload"));
    assert!(table.lines().nth(1).unwrap().starts_with("pingpong"));
    assert_eq!(comparison.to_string(), table);
}

#[test]
fn unreadable_summary_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("garbage.json");
    fs::write(&path, "not json").unwrap();
    assert!(matches!(load_summary(&path).unwrap_err(), SimError::Json { .. }));
    assert!(matches!(
        load_summary(&dir.path().join("absent.json")).unwrap_err(),
        SimError::Io { .. }
    ));
}
