use crate::config::WorkloadSpec;
use crate::record;
use crate::types::Record;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Raw output from runs after the first parse failure lands here.
pub(crate) const FAILURE_SUBDIR: &str = "FAILED";

/// Runs the full iteration × workload matrix and returns one record per run
/// in execution order.
///
/// Every run's raw output is persisted before parsing is attempted. The
/// first parse failure switches raw-output persistence to the failure
/// subdirectory for the rest of the sweep; the failed run itself gets an
/// empty placeholder record so row counts stay aligned across the matrix.
/// Executor errors (the load generator could not run at all) abort the
/// sweep: there is no raw output to record.
pub(crate) fn run_sweep(
    workloads: &[WorkloadSpec],
    iterations: u32,
    output_dir: &Path,
    config_label: &str,
    mut execute: impl FnMut(&WorkloadSpec) -> Result<String>,
) -> Result<Vec<Record>> {
    let mut out_root = output_dir.to_path_buf();
    let mut records = Vec::with_capacity(workloads.len() * iterations as usize);

    for iteration in 0..iterations {
        for (idx, workload) in workloads.iter().enumerate() {
            let workload_id = idx + 1;
            println!(
                "== iteration {iteration} | workload {workload_id}/{} ({}) ==",
                workloads.len(),
                workload.name()
            );

            let raw = execute(workload)?;
            println!("{raw}");
            record::save_raw_output(&out_root, workload_id, iteration, &raw)?;

            match record::derive_record(workload, &raw, iteration, config_label) {
                Ok(rec) => {
                    println!("parsed {} fields", rec.len());
                    records.push(rec);
                }
                Err(err) => {
                    println!(
                        "workload {} iteration {iteration} FAILED: {err:#}",
                        workload.name()
                    );
                    out_root = failure_root(output_dir)?;
                    records.push(Record::default());
                }
            }
        }
    }

    Ok(records)
}

fn failure_root(output_dir: &Path) -> Result<PathBuf> {
    let dir = output_dir.join(FAILURE_SUBDIR);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create failure dir: {}", dir.display()))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_REPORT: &str = "\
Running 5s test @ http://localhost:8080/hello
  Latency Distribution (HdrHistogram - Recorded Latency)
 50.000%    3.24ms
 99.000%    8.37ms
100.000%   18.29ms
#[Mean    =        3.419, StdDeviation   =        1.913]
  9999 requests in 5.00s, 3.55MB read
Requests/sec:   1999.80
";

    const BAD_REPORT: &str = "wrk: unable to connect to localhost:8080\n";

    fn workloads() -> Vec<WorkloadSpec> {
        let raw = r#"[
            {"distribution":"exp","threads":2,"connections":16,"duration":5,
             "script":"a.lua","url":"http://localhost:8080","rps":1000},
            {"distribution":"fixed","threads":2,"connections":16,"duration":5,
             "script":"b.lua","url":"http://localhost:8080","rps":500}
        ]"#;
        match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(err) => panic!("failed to parse workloads: {err}"),
        }
    }

    #[test]
    fn failed_run_keeps_row_alignment() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let workloads = workloads();

        // Run order: iter0 a, iter0 b, iter1 a, iter1 b. The last run (b,
        // iteration 1) produces unparseable output.
        let mut calls = 0_u32;
        let records = run_sweep(&workloads, 2, dir.path(), "label", |_| {
            calls += 1;
            if calls == 4 {
                Ok(BAD_REPORT.to_string())
            } else {
                Ok(GOOD_REPORT.to_string())
            }
        })
        .unwrap_or_else(|e| panic!("{e:#}"));

        assert_eq!(records.len(), 4);
        assert!(!records[0].is_empty());
        assert!(!records[1].is_empty());
        assert!(!records[2].is_empty());
        assert!(records[3].is_empty());

        // Raw output exists for every run, including the failed one.
        for (workload_id, iteration) in [(1, 0), (2, 0), (1, 1), (2, 1)] {
            let path = dir
                .path()
                .join(workload_id.to_string())
                .join(format!("{iteration}.wrk"));
            assert!(path.is_file(), "missing raw output: {}", path.display());
        }

        assert!(dir.path().join(FAILURE_SUBDIR).is_dir());
    }

    #[test]
    fn failure_redirects_subsequent_raw_output() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let workloads = workloads();

        // Workload b fails on the first iteration; every later run's raw
        // output must land under FAILED/.
        let mut calls = 0_u32;
        let records = run_sweep(&workloads, 2, dir.path(), "label", |_| {
            calls += 1;
            if calls == 2 {
                Ok(BAD_REPORT.to_string())
            } else {
                Ok(GOOD_REPORT.to_string())
            }
        })
        .unwrap_or_else(|e| panic!("{e:#}"));

        assert_eq!(records.len(), 4);
        assert!(records[1].is_empty());

        // Before the failure: normal root. The failing run itself was saved
        // before parsing, so it is in the normal root too.
        assert!(dir.path().join("1").join("0.wrk").is_file());
        assert!(dir.path().join("2").join("0.wrk").is_file());

        // After the failure: failure root.
        let failed = dir.path().join(FAILURE_SUBDIR);
        assert!(failed.join("1").join("1.wrk").is_file());
        assert!(failed.join("2").join("1.wrk").is_file());
    }

    #[test]
    fn summary_csv_covers_the_full_matrix() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let workloads = workloads();

        let mut calls = 0_u32;
        let records = run_sweep(&workloads, 2, dir.path(), "baseline", |_| {
            calls += 1;
            if calls == 4 {
                Ok(BAD_REPORT.to_string())
            } else {
                Ok(GOOD_REPORT.to_string())
            }
        })
        .unwrap_or_else(|e| panic!("{e:#}"));

        let csv_path = dir.path().join(crate::report::SUMMARY_FILE);
        crate::report::write_summary_csv(&csv_path, &records)
            .unwrap_or_else(|e| panic!("{e:#}"));

        let csv = std::fs::read_to_string(&csv_path).unwrap_or_else(|e| panic!("{e}"));
        let lines: Vec<&str> = csv.lines().collect();

        // Header + one row per (iteration, workload) pair.
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("workload_iteration,distribution,threads"));
        assert!(lines[0].ends_with("config_info"));

        // The failed run serializes as an all-blank row.
        let columns = lines[0].split(',').count();
        assert_eq!(lines[4], ",".repeat(columns - 1));
    }

    #[test]
    fn executor_errors_abort_the_sweep() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let workloads = workloads();

        let result = run_sweep(&workloads, 1, dir.path(), "label", |_| {
            anyhow::bail!("spawn failed")
        });

        assert!(result.is_err());
    }

    #[test]
    fn records_follow_iteration_then_workload_order() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let workloads = workloads();

        let mut seen = Vec::new();
        let records = run_sweep(&workloads, 2, dir.path(), "label", |w| {
            seen.push(w.name().to_string());
            Ok(GOOD_REPORT.to_string())
        })
        .unwrap_or_else(|e| panic!("{e:#}"));

        assert_eq!(seen, vec!["a", "b", "a", "b"]);
        assert_eq!(records.len(), 4);
        for (i, expected_iter) in [(0_usize, 0_u64), (1, 0), (2, 1), (3, 1)] {
            assert_eq!(
                records[i].get("workload_iteration"),
                Some(&crate::types::FieldValue::Int(expected_iter))
            );
        }
    }
}
