//! pixlab-bench: CLI tool for running engine operations on image files.
//!
//! Decodes an image, applies a sequence of operations, and prints
//! statistics and per-operation timings. Useful for:
//!
//! - Checking what an operation chain does to a real image
//! - Comparing nearest and bilinear rotation
//! - Measuring per-operation durations, with and without `parallel`
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin pixlab-bench -- [OPTIONS] <IMAGE_PATH>
//! cargo run --release --bin pixlab-bench -- photo.png --op blur:radius=3 --op edge-detection
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use pixlab_engine::stats::DEFAULT_MATRIX_SIZE;
use pixlab_engine::{
    Clock, Histogram, ImageStatistics, MemorySink, Operation, PixelBuffer, Sampling, Session,
    sample_matrix,
};
use serde::Serialize;

/// Run pixlab operations on an image and report statistics and timings.
#[derive(Parser)]
#[command(name = "pixlab-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Operation to apply, as `NAME[:key=value,...]`.
    ///
    /// Repeat to build a chain, applied in order. Examples:
    /// `invert`, `blur:radius=3`, `rotate:angle=45`.
    #[arg(long = "op", value_name = "OP")]
    ops: Vec<String>,

    /// Operation chain as a JSON array of operations.
    ///
    /// When provided, `--op` flags are ignored.
    #[arg(long)]
    ops_json: Option<String>,

    /// Sampling used by `--op rotate` at non-right angles.
    #[arg(long, value_enum, default_value_t = SamplingArg::Nearest)]
    sampling: SamplingArg,

    /// Write the final buffer to this path as PNG.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the luma histogram of the final buffer.
    #[arg(long)]
    histogram: bool,

    /// Print the pixel matrix sampled around the image center.
    #[arg(long)]
    matrix: bool,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output results as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

/// Rotation sampling selection.
#[derive(Clone, Copy, ValueEnum)]
enum SamplingArg {
    /// Nearest source pixel (fast, blocky).
    Nearest,
    /// Blend of the four surrounding pixels (smoother).
    Bilinear,
}

impl From<SamplingArg> for Sampling {
    fn from(arg: SamplingArg) -> Self {
        match arg {
            SamplingArg::Nearest => Self::Nearest,
            SamplingArg::Bilinear => Self::Bilinear,
        }
    }
}

/// Everything one run produces, for `--json`.
#[derive(Serialize)]
struct RunOutput<'a> {
    telemetry: &'a MemorySink,
    statistics: ImageStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    histogram: Option<Histogram>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matrix: Option<Vec<Vec<[u8; 4]>>>,
}

/// Parse one `--op` value such as `blur:radius=3` or `flip-vertical`.
fn parse_op(arg: &str, sampling: Sampling) -> Result<Operation, String> {
    let (name, rest) = arg.split_once(':').unwrap_or((arg, ""));
    let mut params = BTreeMap::new();
    for pair in rest.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("Error parsing --op {arg}: expected key=value, got `{pair}`"))?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|e| format!("Error parsing --op {arg}: `{key}`: {e}"))?;
        params.insert(key.trim().to_owned(), value);
    }
    let mut op = Operation::from_parts(name.trim(), &params)
        .map_err(|e| format!("Error parsing --op {arg}: {e}"))?;
    if let Operation::Rotate(ref mut p) = op {
        p.sampling = sampling;
    }
    Ok(op)
}

/// Build the operation chain from CLI arguments.
///
/// If `--ops-json` is provided, the JSON is parsed directly and all
/// `--op` flags are ignored.
fn ops_from_cli(cli: &Cli) -> Result<Vec<Operation>, String> {
    if let Some(ref json) = cli.ops_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --ops-json: {e}"));
    }
    let sampling = Sampling::from(cli.sampling);
    cli.ops.iter().map(|arg| parse_op(arg, sampling)).collect()
}

fn load(path: &Path) -> Result<PixelBuffer, String> {
    let image = image::open(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    log::debug!("decoded {} as {:?}", path.display(), image.color());
    PixelBuffer::try_from(image.to_rgba8())
        .map_err(|e| format!("Error loading {}: {e}", path.display()))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let ops = match ops_from_cli(&cli) {
        Ok(ops) => ops,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let buffer = match load(&cli.image_path) {
        Ok(buffer) => buffer,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Image: {} ({})", cli.image_path.display(), buffer.dimensions());
    eprintln!("Operations: {}", describe(&ops));
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut session = Session::new(buffer);
    let mut all_sinks = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }
        session.reset();

        let mut sink = MemorySink::new();
        if let Err(e) = session.apply_all(&ops, &StdClock, &mut sink) {
            eprintln!("Operation error: {e}");
            return ExitCode::FAILURE;
        }

        if run == 0 && !print_results(&cli, &session, &sink) {
            return ExitCode::FAILURE;
        }
        all_sinks.push(sink);

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_sinks);
    }

    if let Some(ref path) = cli.output {
        let dims = session.current().dimensions();
        let written = session
            .into_current()
            .into_rgba_image()
            .map_err(|e| e.to_string())
            .and_then(|image| {
                image
                    .save_with_format(path, image::ImageFormat::Png)
                    .map_err(|e| e.to_string())
            });
        match written {
            Ok(()) => eprintln!("PNG written to {} ({dims})", path.display()),
            Err(e) => {
                eprintln!("Error writing {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn describe(ops: &[Operation]) -> String {
    if ops.is_empty() {
        return "(none)".to_owned();
    }
    ops.iter().map(ToString::to_string).collect::<Vec<_>>().join(" -> ")
}

/// Print the report for one run. Returns `false` on a serialization error.
fn print_results(cli: &Cli, session: &Session, sink: &MemorySink) -> bool {
    let statistics = session.statistics();
    let histogram = cli.histogram.then(|| session.histogram());
    let matrix = cli
        .matrix
        .then(|| sample_matrix(session.current(), DEFAULT_MATRIX_SIZE));

    if cli.json {
        let output = RunOutput {
            telemetry: sink,
            statistics,
            histogram,
            matrix,
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing results: {e}");
                return false;
            }
        }
        return true;
    }

    println!("{}", sink.report());
    println!();
    print_statistics(&statistics);
    if let Some(ref histogram) = histogram {
        println!();
        print_histogram(histogram);
    }
    if let Some(ref matrix) = matrix {
        println!();
        print_matrix(matrix);
    }
    true
}

fn print_statistics(stats: &ImageStatistics) {
    println!("Statistics\n{}", "=".repeat(60));
    println!("{:<24} {}x{}", "Dimensions", stats.width, stats.height);
    println!("{:<24} {}", "Total pixels", stats.total_pixels);
    println!(
        "{:<24} R={} G={} B={}",
        "Average color", stats.avg_red, stats.avg_green, stats.avg_blue
    );
    println!("{:<24} {}", "Memory", stats.memory_usage);
}

/// Width of the widest histogram bar in characters.
const HISTOGRAM_WIDTH: u64 = 50;

/// Print the histogram in 16 bands of 16 luma values each.
fn print_histogram(histogram: &Histogram) {
    println!("Luma Histogram\n{}", "=".repeat(60));
    let bands: Vec<u64> = histogram
        .counts()
        .chunks(16)
        .map(|band| band.iter().sum())
        .collect();
    let peak = bands.iter().copied().max().unwrap_or(0).max(1);
    for (i, count) in bands.iter().enumerate() {
        let bar = usize::try_from(count * HISTOGRAM_WIDTH / peak).unwrap_or(0);
        println!(
            "{:>3}-{:<3} {:>10} {}",
            i * 16,
            i * 16 + 15,
            count,
            "#".repeat(bar)
        );
    }
}

fn print_matrix(matrix: &[Vec<[u8; 4]>]) {
    println!("Center Pixels (RGBA)\n{}", "=".repeat(60));
    for row in matrix {
        let cells: Vec<String> = row
            .iter()
            .map(|[r, g, b, a]| format!("{r:>3},{g:>3},{b:>3},{a:>3}"))
            .collect();
        println!("{}", cells.join("  "));
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Print aggregated timings across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_sinks: &[MemorySink]) {
    debug_assert!(!all_sinks.is_empty(), "no runs to summarize");

    println!();
    println!("Summary ({} runs)\n{}", all_sinks.len(), "=".repeat(60));

    if all_sinks.is_empty() {
        println!("Warning: no runs to summarize");
        return;
    }

    let totals: Vec<f64> = all_sinks
        .iter()
        .map(|s| s.total_duration().as_secs_f64() * 1000.0)
        .collect();

    let min = totals.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = totals.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = totals.iter().sum::<f64>() / totals.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Per-operation means, by position in the chain.
    println!();
    println!("{:<32} {:>12}", "Operation", "Mean (ms)");
    println!("{}", "-".repeat(46));

    let Some(first) = all_sinks.first() else {
        return;
    };
    for (i, record) in first.records().iter().enumerate() {
        let durations: Vec<f64> = all_sinks
            .iter()
            .filter_map(|s| s.records().get(i))
            .map(|r| r.duration.as_secs_f64() * 1000.0)
            .collect();
        let op_mean = durations.iter().sum::<f64>() / durations.len() as f64;
        println!("{:<32} {op_mean:>10.3}ms", record.operation.to_string());
    }
}
