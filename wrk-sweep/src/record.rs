use crate::config::WorkloadSpec;
use crate::parse;
use crate::types::Record;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Histogram bookkeeping fields from the report footer; non-scalar, dropped
/// before tabular export.
const HISTOGRAM_FIELDS: [&str; 2] = ["Buckets", "SubBuckets"];

/// Writes the raw report under `<root>/<workload_id>/<iteration>.wrk`,
/// creating the per-workload directory on demand.
pub(crate) fn save_raw_output(
    root: &Path,
    workload_id: usize,
    iteration: u32,
    raw: &str,
) -> Result<()> {
    let dir = root.join(workload_id.to_string());
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output dir: {}", dir.display()))?;

    let path = dir.join(format!("{iteration}.wrk"));
    fs::write(&path, raw).with_context(|| format!("failed to write raw output: {}", path.display()))
}

/// Builds the flattened metrics row for one run.
///
/// Merge order, later keys overriding earlier ones in place: workload config,
/// summary stats, latency table, error counters, then the operator-supplied
/// `config_info` label. Either the full record comes back or the first parse
/// error does; the caller branches on that.
pub(crate) fn derive_record(
    workload: &WorkloadSpec,
    raw: &str,
    iteration: u32,
    config_label: &str,
) -> Result<Record> {
    let mut record = workload_fields(workload, iteration);
    record.merge(parse::parse_summary_stats(raw)?);
    record.merge(parse::parse_latency_table(raw)?);
    record.merge(parse::parse_error_counters(raw));

    for field in HISTOGRAM_FIELDS {
        record.remove(field);
    }
    record.insert("config_info", config_label);

    Ok(record)
}

fn workload_fields(workload: &WorkloadSpec, iteration: u32) -> Record {
    let mut record = Record::default();
    record.insert("workload_iteration", u64::from(iteration));
    record.insert("distribution", workload.distribution.as_str());
    record.insert("threads", u64::from(workload.threads));
    record.insert("connections", u64::from(workload.connections));
    record.insert("duration", u64::from(workload.duration));
    record.insert("workload_name", workload.name());
    record.insert("rps", u64::from(workload.rps));
    record
}
