use crate::config::WorkloadSpec;
use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs the load generator for one workload and returns its combined
/// textual report.
///
/// Blocks for the workload's full duration; wrk's own `-d` bound is the
/// only timeout. stderr is appended after stdout so calibration warnings
/// stay visible in the saved report.
pub(crate) fn run_workload(
    wrk: &Path,
    scripts_dir: &Path,
    workload: &WorkloadSpec,
) -> Result<String> {
    let mut cmd = Command::new(wrk);
    cmd.args(wrk_args(scripts_dir, workload)).stdin(Stdio::null());

    print_invocation("wrk", &cmd);

    let out = cmd
        .output()
        .with_context(|| format!("failed to run load generator: {}", wrk.display()))?;

    let mut report = String::from_utf8_lossy(&out.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&out.stderr);
    if !stderr.trim().is_empty() {
        if !report.is_empty() && !report.ends_with('\n') {
            report.push('\n');
        }
        report.push_str(&stderr);
    }

    Ok(report)
}

/// Translates a workload spec into the wrk command line. `-L` always: the
/// latency-distribution section it prints is what the parser consumes.
fn wrk_args(scripts_dir: &Path, workload: &WorkloadSpec) -> Vec<String> {
    let script = scripts_dir.join(&workload.script);
    vec![
        "-D".to_string(),
        workload.distribution.clone(),
        "-t".to_string(),
        workload.threads.to_string(),
        "-c".to_string(),
        workload.connections.to_string(),
        "-d".to_string(),
        format!("{}s", workload.duration),
        "-L".to_string(),
        "-s".to_string(),
        script.display().to_string(),
        workload.url.clone(),
        "-R".to_string(),
        workload.rps.to_string(),
    ]
}

fn print_invocation(label: &str, cmd: &Command) {
    println!("{label}: {}", command_to_string(cmd));
}

fn command_to_string(cmd: &Command) -> String {
    let mut out = quote_for_display(&cmd.get_program().to_string_lossy());
    for arg in cmd.get_args() {
        out.push(' ');
        out.push_str(&quote_for_display(&arg.to_string_lossy()));
    }
    out
}

fn quote_for_display(s: &str) -> String {
    // Not a shell-accurate escaper; just makes spaces unambiguous in logs.
    if !s.chars().any(char::is_whitespace) {
        return s.to_string();
    }
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
