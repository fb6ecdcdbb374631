use crate::cli::Cli;
use crate::config;
use crate::report;
use crate::run_error::SweepError;
use crate::runner;
use crate::sweep;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

pub fn run(cli: Cli) -> Result<(), SweepError> {
    prepare_output_dir(&cli.output_dir, cli.scratch).map_err(SweepError::InvalidInput)?;

    let workloads = config::load_workloads(&cli.config).map_err(SweepError::InvalidInput)?;

    println!(
        "sweep: {} workload(s) x {} iteration(s) -> {}",
        workloads.len(),
        cli.iterations,
        cli.output_dir.display()
    );

    let records = sweep::run_sweep(
        &workloads,
        cli.iterations,
        &cli.output_dir,
        &cli.config_label,
        |workload| runner::run_workload(&cli.wrk, &cli.scripts_dir, workload),
    )
    .map_err(SweepError::RuntimeError)?;

    let csv_path = cli.output_dir.join(report::SUMMARY_FILE);
    report::write_summary_csv(&csv_path, &records).map_err(SweepError::RuntimeError)?;
    println!("wrote {} record(s) to {}", records.len(), csv_path.display());

    Ok(())
}

/// An existing output directory is a fatal configuration error unless the
/// operator designated it disposable with --scratch, in which case it is
/// recreated fresh.
fn prepare_output_dir(dir: &Path, scratch: bool) -> Result<()> {
    if dir.exists() {
        if !scratch {
            bail!(
                "output directory already exists: {} (pass --scratch to reuse it as disposable)",
                dir.display()
            );
        }
        fs::remove_dir_all(dir)
            .with_context(|| format!("failed to clear scratch dir: {}", dir.display()))?;
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output dir: {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_output_dir_aborts_before_any_run() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let target = dir.path().join("readings");
        fs::create_dir_all(&target).unwrap_or_else(|e| panic!("{e}"));

        let err = match prepare_output_dir(&target, false) {
            Ok(()) => panic!("expected a collision error"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn scratch_dir_is_recreated_fresh() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let target = dir.path().join("test");
        fs::create_dir_all(&target).unwrap_or_else(|e| panic!("{e}"));
        fs::write(target.join("stale.csv"), "old").unwrap_or_else(|e| panic!("{e}"));

        prepare_output_dir(&target, true).unwrap_or_else(|e| panic!("{e:#}"));

        assert!(target.is_dir());
        assert!(!target.join("stale.csv").exists());
    }

    #[test]
    fn fresh_output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let target = dir.path().join("new-readings");

        prepare_output_dir(&target, false).unwrap_or_else(|e| panic!("{e:#}"));
        assert!(target.is_dir());
    }
}
