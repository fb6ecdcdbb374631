use crate::types::Record;
use anyhow::{Context, Result, bail};
use std::path::Path;

pub(crate) const SUMMARY_FILE: &str = "summary_stats.csv";

/// Writes the accumulated records as one CSV table.
///
/// The header is the first record's key set in insertion order. Every row is
/// serialized against that fixed header: absent fields become empty cells,
/// keys not present in the first record are dropped. An empty first record
/// (the first run failed to parse) cannot yield a usable header and is an
/// error.
pub(crate) fn write_summary_csv(path: &Path, records: &[Record]) -> Result<()> {
    let first = records
        .first()
        .context("no records accumulated, nothing to write")?;

    let header: Vec<&str> = first.keys().collect();
    if header.is_empty() {
        bail!("first record is empty (first run failed), cannot derive CSV header");
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create summary CSV: {}", path.display()))?;

    writer.write_record(&header)?;
    for record in records {
        let row = header
            .iter()
            .map(|key| record.get(key).map(ToString::to_string).unwrap_or_default());
        writer.write_record(row)?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush summary CSV: {}", path.display()))?;

    Ok(())
}
