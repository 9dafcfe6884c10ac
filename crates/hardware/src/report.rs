//! Baseline vs. mitigated comparison.
//!
//! Pairs summaries of the same workloads run without and with the
//! false-sharing mitigation, and tabulates `ipki` and `ipc_proxy` per workload.
//! The two lists are position-paired; lists (and labels, if given) of unequal
//! length are rejected before anything is loaded or computed.

use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::common::{Result, SimError};
use crate::stats::Summary;

/// One workload's baseline and mitigated metrics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonRow {
    /// Workload label.
    pub label: String,
    /// Baseline invalidations per kilo-instruction.
    pub ipki_base: f64,
    /// Mitigated invalidations per kilo-instruction.
    pub ipki_fix: f64,
    /// Baseline IPC proxy.
    pub ipc_base: f64,
    /// Mitigated IPC proxy.
    pub ipc_fix: f64,
}

impl ComparisonRow {
    /// Change in IPKI from baseline to mitigated (negative is an improvement).
    pub const fn ipki_delta(&self) -> f64 {
        self.ipki_fix - self.ipki_base
    }

    /// Change in IPC proxy from baseline to mitigated (positive is an improvement).
    pub const fn ipc_delta(&self) -> f64 {
        self.ipc_fix - self.ipc_base
    }
}

/// Validated set of paired runs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Comparison {
    rows: Vec<ComparisonRow>,
}

/// Checks that the paired inputs line up.
///
/// # Errors
///
/// [`SimError::Config`] if the lists differ in length or the label count
/// does not match them.
pub fn check_pairing(baseline: usize, fix: usize, labels: Option<usize>) -> Result<()> {
    if baseline != fix {
        return Err(SimError::Config(format!(
            "baseline and fix lists must have same length ({baseline} vs {fix})"
        )));
    }
    if let Some(labels) = labels.filter(|&n| n != baseline) {
        return Err(SimError::Config(format!(
            "labels length must match baseline/fix ({labels} vs {baseline})"
        )));
    }
    Ok(())
}

impl Comparison {
    /// Pairs already-loaded summaries.
    ///
    /// Without labels, workloads are named `w0`, `w1`, ...
    ///
    /// # Errors
    ///
    /// As [`check_pairing`].
    pub fn new(baseline: &[Summary], fix: &[Summary], labels: Option<Vec<String>>) -> Result<Self> {
        check_pairing(baseline.len(), fix.len(), labels.as_ref().map(Vec::len))?;
        let labels = labels.unwrap_or_else(|| (0..baseline.len()).map(|i| format!("w{i}")).collect());
        let rows = baseline
            .iter()
            .zip(fix)
            .zip(labels)
            .map(|((base, fix), label)| ComparisonRow {
                label,
                ipki_base: base.ipki,
                ipki_fix: fix.ipki,
                ipc_base: base.ipc_proxy,
                ipc_fix: fix.ipc_proxy,
            })
            .collect();
        Ok(Self { rows })
    }

    /// Validates the pairing, then loads every summary file.
    ///
    /// # Errors
    ///
    /// [`SimError::Config`] on a pairing mismatch (checked before any file is
    /// opened), otherwise [`SimError::Io`] or [`SimError::Json`] for the first
    /// file that cannot be loaded.
    pub fn from_files(baseline: &[PathBuf], fix: &[PathBuf], labels: Option<Vec<String>>) -> Result<Self> {
        check_pairing(baseline.len(), fix.len(), labels.as_ref().map(Vec::len))?;
        let base = baseline.iter().map(|p| load_summary(p)).collect::<Result<Vec<_>>>()?;
        let fixed = fix.iter().map(|p| load_summary(p)).collect::<Result<Vec<_>>>()?;
        Self::new(&base, &fixed, labels)
    }

    /// Rows in input order.
    pub const fn rows(&self) -> &[ComparisonRow] {
        self.rows.as_slice()
    }

    /// Renders an aligned text table.
    pub fn render(&self) -> String {
        let width = self
            .rows
            .iter()
            .map(|r| r.label.len())
            .max()
            .unwrap_or(0)
            .max("workload".len());
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<width$}  {:>10} {:>10} {:>10}  {:>10} {:>10} {:>10}",
            "workload", "ipki_base", "ipki_fix", "delta", "ipc_base", "ipc_fix", "delta"
        );
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:<width$}  {:>10.4} {:>10.4} {:>+10.4}  {:>10.4} {:>10.4} {:>+10.4}",
                row.label,
                row.ipki_base,
                row.ipki_fix,
                row.ipki_delta(),
                row.ipc_base,
                row.ipc_fix,
                row.ipc_delta()
            );
        }
        out
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Reads a summary JSON file; missing fields default to zero.
///
/// # Errors
///
/// [`SimError::Io`] if the file cannot be read, [`SimError::Json`] if it is not a summary.
pub fn load_summary(path: &Path) -> Result<Summary> {
    let text = fs::read_to_string(path)
        .map_err(|e| SimError::io(format!("reading summary {}", path.display()), e))?;
    serde_json::from_str(&text).map_err(|e| SimError::json(format!("parsing summary {}", path.display()), e))
}
