use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// One load-test scenario from the workload config document.
///
/// Parsed once at startup and never mutated; identity within the sweep is
/// the position in the configured sequence.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WorkloadSpec {
    /// Request-rate distribution model passed to `wrk -D` (e.g. "exp", "fixed").
    pub(crate) distribution: String,
    pub(crate) threads: u32,
    pub(crate) connections: u32,
    /// Run length in seconds.
    pub(crate) duration: u32,
    /// Script filename, resolved against the scripts directory.
    pub(crate) script: String,
    pub(crate) url: String,
    /// Target request rate passed to `wrk -R`.
    pub(crate) rps: u32,
}

impl WorkloadSpec {
    /// Script filename with its extension stripped; used as the
    /// `workload_name` column and in log lines.
    pub(crate) fn name(&self) -> &str {
        match self.script.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.script,
        }
    }
}

pub(crate) fn load_workloads(path: &Path) -> Result<Vec<WorkloadSpec>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read workload config: {}", path.display()))?;

    let workloads: Vec<WorkloadSpec> = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse workload config: {}", path.display()))?;

    if workloads.is_empty() {
        anyhow::bail!("workload config is empty: {}", path.display());
    }

    Ok(workloads)
}
