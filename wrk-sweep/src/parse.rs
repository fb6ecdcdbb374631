use crate::types::{FieldValue, Record};
use anyhow::{Context, Result, bail};

const LATENCY_SECTION_MARKER: &str = "Latency Distribution";
const LATENCY_TABLE_END: &str = "100.000%";
const SUMMARY_LINE_MARKER: char = '#';
const NON2XX_MARKER: &str = "Non-2xx or 3xx responses:";
const RPS_MARKER: &str = "Requests/sec:";
const SOCKET_ERRORS_MARKER: &str = "Socket errors:";
const REQUESTS_IN_MARKER: &str = "requests in";

/// Socket error kinds wrk reports; all four default to zero when the report
/// has no `Socket errors` line at all.
const SOCKET_ERROR_KINDS: [&str; 4] = ["connect", "read", "write", "timeout"];

/// Converts a wrk latency token ("6.46ms", "1.2s", "3m") to milliseconds.
///
/// "nan" tokens and tokens without a recognized unit pass through verbatim
/// so a single odd cell never fails the whole run. The "ms" suffix is
/// checked before "s" on the exact trailing unit; "6.46ms" must never be
/// read as seconds.
pub(crate) fn convert_latency(token: &str) -> Result<FieldValue> {
    let token = token.trim();
    if is_nan_token(token) {
        return Ok(FieldValue::Str(token.to_string()));
    }

    if let Some(num) = token.strip_suffix("ms") {
        return scale_latency(num, token, 1.0);
    }
    if let Some(num) = token.strip_suffix('s') {
        return scale_latency(num, token, 1_000.0);
    }
    if let Some(num) = token.strip_suffix('m') {
        return scale_latency(num, token, 60_000.0);
    }

    println!("INFO: latency token without recognized unit, keeping verbatim: {token}");
    Ok(FieldValue::Str(token.to_string()))
}

fn scale_latency(num: &str, token: &str, to_millis: f64) -> Result<FieldValue> {
    let v: f64 = num
        .trim()
        .parse()
        .with_context(|| format!("invalid latency value `{token}`"))?;
    Ok(FieldValue::Num(v * to_millis))
}

fn is_nan_token(token: &str) -> bool {
    token.to_ascii_lowercase().contains("nan")
}

/// Extracts the latency-percentile table from one raw report.
///
/// The table starts at the `Latency Distribution` header and ends at the
/// `100.000%` row. A report without the section (crashed run, empty output)
/// is a parse error for the whole run.
pub(crate) fn parse_latency_table(report: &str) -> Result<Record> {
    let mut lines = report.lines();
    lines
        .by_ref()
        .find(|line| line.contains(LATENCY_SECTION_MARKER))
        .with_context(|| format!("report has no `{LATENCY_SECTION_MARKER}` section"))?;

    let mut table = Record::default();
    let mut complete = false;
    for line in lines {
        let Some((label, value)) = split_percentile_row(line) else {
            continue;
        };
        let latency = convert_latency(value)?;
        let done = label == LATENCY_TABLE_END;
        table.insert(label, latency);
        if done {
            complete = true;
            break;
        }
    }

    if !complete {
        bail!("latency distribution table has no `{LATENCY_TABLE_END}` row");
    }

    Ok(table)
}

fn split_percentile_row(line: &str) -> Option<(&str, &str)> {
    let mut tokens = line.split_whitespace();
    let label = tokens.next()?;
    let value = tokens.next()?;
    if !is_percentile_label(label) {
        return None;
    }
    Some((label, value))
}

fn is_percentile_label(token: &str) -> bool {
    let Some(num) = token.strip_suffix('%') else {
        return false;
    };
    num.contains('.') && !num.is_empty() && num.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Accumulates `#[key = value, ...]` summary lines into one key set.
///
/// Later lines override earlier keys. Values containing "nan" are stored as
/// the literal "nan" string instead of a float.
pub(crate) fn parse_summary_stats(report: &str) -> Result<Record> {
    let mut stats = Record::default();
    for line in report.lines() {
        let line = line.trim();
        let Some(body) = line.strip_prefix(SUMMARY_LINE_MARKER) else {
            continue;
        };

        let body = body.trim().trim_start_matches('[').trim_end_matches(']');
        for pair in body.split(',') {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("malformed summary stat `{}` in `{line}`", pair.trim()))?;
            let key = key.trim();
            let value = value.trim();

            if is_nan_token(value) {
                stats.insert(key, "nan");
            } else {
                let v: f64 = value
                    .parse()
                    .with_context(|| format!("invalid summary stat value `{value}` for `{key}`"))?;
                stats.insert(key, v);
            }
        }
    }
    Ok(stats)
}

/// Extracts connection-level error counts and achieved throughput.
///
/// Every field defaults instead of failing; error-path runs are where these
/// numbers matter most, so malformed marker lines are logged and skipped.
pub(crate) fn parse_error_counters(report: &str) -> Record {
    let mut socket_errors = Record::default();
    let mut non2xx = 0.0_f64;
    let mut actual_rps = 0.0_f64;
    let mut total_requests = 0_u64;

    for line in report.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(NON2XX_MARKER) {
            match rest.trim().parse::<f64>() {
                Ok(v) => non2xx = v,
                Err(_) => println!("INFO: unreadable non-2xx count, keeping default: {line}"),
            }
        } else if let Some(rest) = line.strip_prefix(RPS_MARKER) {
            match rest.split_whitespace().next().and_then(|t| t.parse::<f64>().ok()) {
                Some(v) => actual_rps = v,
                None => println!("INFO: unreadable Requests/sec, keeping default: {line}"),
            }
        } else if let Some(rest) = line.strip_prefix(SOCKET_ERRORS_MARKER) {
            for entry in rest.split(',') {
                let mut tokens = entry.split_whitespace();
                let kind = tokens.next();
                let count = tokens.next().and_then(|t| t.parse::<u64>().ok());
                match (kind, count) {
                    (Some(kind), Some(count)) => {
                        socket_errors.insert(format!("{kind}_errors"), count);
                    }
                    _ => println!(
                        "INFO: unreadable socket error entry `{}`, skipping",
                        entry.trim()
                    ),
                }
            }
        } else if line.contains(REQUESTS_IN_MARKER) {
            match line.split_whitespace().next().and_then(|t| t.parse::<u64>().ok()) {
                Some(v) => total_requests = v,
                None => println!("INFO: unreadable request total, keeping default: {line}"),
            }
        }
    }

    let mut counters = if socket_errors.is_empty() {
        let mut defaults = Record::default();
        for kind in SOCKET_ERROR_KINDS {
            defaults.insert(format!("{kind}_errors"), 0_u64);
        }
        defaults
    } else {
        socket_errors
    };

    counters.insert("total_requests", total_requests);
    counters.insert("non2xx_errors", non2xx);
    counters.insert("actual_rps", actual_rps);
    counters
}
