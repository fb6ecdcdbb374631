use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "wrk-sweep",
    author,
    version,
    about = "Repeated wrk benchmark sweeps with metrics extraction",
    long_about = "wrk-sweep drives the external `wrk` load generator over a matrix of configured workloads for a fixed number of iterations, saves every raw report, extracts latency/throughput/error metrics from the report text, and accumulates a single summary_stats.csv for offline analysis.",
    after_help = "Examples:\n  wrk-sweep readings/baseline baseline-no-mesh\n  wrk-sweep readings/istio istio-enabled --config istio.json --iterations 5\n  wrk-sweep test smoke --scratch --iterations 1"
)]
pub struct Cli {
    /// Directory that collects raw per-run reports and the final summary CSV
    pub output_dir: PathBuf,

    /// Free-form label recorded in every row (for cross-sweep comparison)
    pub config_label: String,

    /// JSON document with the ordered workload sequence
    #[arg(long, env = "SWEEP_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    /// Directory the per-workload script filenames are resolved against
    #[arg(long, env = "SWEEP_SCRIPTS_DIR", default_value = "scripts")]
    pub scripts_dir: PathBuf,

    /// How many times the full workload sequence repeats
    #[arg(long, env = "SWEEP_ITERATIONS", default_value_t = 10)]
    pub iterations: u32,

    /// Load-generator binary to invoke
    #[arg(long, env = "SWEEP_WRK_BIN", default_value = "wrk")]
    pub wrk: PathBuf,

    /// Treat an existing output directory as disposable scratch: remove and
    /// recreate it instead of aborting
    #[arg(long)]
    pub scratch: bool,
}
