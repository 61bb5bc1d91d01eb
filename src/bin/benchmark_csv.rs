//! Benchmarking tool that outputs CSV data for plotting parsing time vs input length.
//!
//! Usage:
//!   cargo run --release --bin benchmark_csv
//!
//! Output:
//!   Creates results/benchmark_expr.csv with columns:
//!   shape, input_length, token_count, steps, median_time_ns, mad_ns, peak_memory_bytes, iterations, success
use memory_stats::memory_stats;
use predictive_expr::grammars::tokenize;
use predictive_expr::LLParser;
use std::fs::{self, File};
use std::hint::black_box;
use std::io::Write;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;
use std::time::Instant;

// ============================================================================
// Configuration
// ============================================================================

/// Shape of the generated expressions
#[derive(Clone, Copy)]
enum Shape {
    /// `1+2*3-4/5+...`, long and flat
    Flat,
    /// `((((5))))`, stack depth grows with length
    Nested,
    /// `(1+2)*(3-4)/(5+6)...`, mix of both
    Mixed,
}

impl Shape {
    fn name(&self) -> &'static str {
        match self {
            Shape::Flat => "flat",
            Shape::Nested => "nested",
            Shape::Mixed => "mixed",
        }
    }

    /// Generate a well-formed expression with roughly `size` operands, `$`-terminated
    fn generate(&self, size: usize) -> String {
        let ops = ['+', '*', '-', '/'];
        let mut expr = String::new();
        match self {
            Shape::Flat => {
                for i in 0..size {
                    if i > 0 {
                        expr.push(ops[i % ops.len()]);
                    }
                    expr.push(char::from(b'0' + (i % 10) as u8));
                }
            }
            Shape::Nested => {
                expr.push_str(&"(".repeat(size));
                expr.push('5');
                expr.push_str(&")".repeat(size));
            }
            Shape::Mixed => {
                for i in 0..size.max(1) {
                    if i > 0 {
                        expr.push(ops[i % ops.len()]);
                    }
                    expr.push_str(&format!("({}+{})", i % 10, (i + 1) % 10));
                }
            }
        }
        expr.push('$');
        expr
    }
}

const SHAPES: &[Shape] = &[Shape::Flat, Shape::Nested, Shape::Mixed];
const SIZES: &[usize] = &[1, 10, 100, 1_000, 10_000, 100_000];
const OUTPUT_PATH: &str = "results/benchmark_expr.csv";

const WARMUP_ITERATIONS: u32 = 1;
const MIN_ITERATIONS: u32 = 5;
const MAX_ITERATIONS: u32 = 20;
const TARGET_TIME: Duration = Duration::from_millis(500);

#[derive(Clone)]
struct BenchmarkResult {
    shape: &'static str,
    input_length: usize,
    token_count: usize,
    steps: usize,
    median_time_ns: f64,
    mad_ns: f64,
    peak_memory_bytes: usize,
    iterations: u32,
    success: bool,
}

impl BenchmarkResult {
    fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{:.2},{:.2},{},{},{}",
            self.shape,
            self.input_length,
            self.token_count,
            self.steps,
            self.median_time_ns,
            self.mad_ns,
            self.peak_memory_bytes,
            self.iterations,
            self.success
        )
    }
}

// ============================================================================
// Measurement Functions
// ============================================================================

/// Measure peak memory usage during parsing using a sampling thread
fn measure_peak_memory<F>(mut parse_fn: F) -> usize
where
    F: FnMut() -> bool,
{
    let start_mem = memory_stats().map(|u| u.physical_mem).unwrap_or(0);

    let peak_mem = Arc::new(AtomicUsize::new(start_mem));
    let stop_signal = Arc::new(AtomicBool::new(false));

    let t_peak = peak_mem.clone();
    let t_stop = stop_signal.clone();

    // Spawn sampler thread (1ms interval)
    let sampler = thread::spawn(move || {
        while !t_stop.load(Ordering::Relaxed) {
            if let Some(usage) = memory_stats() {
                t_peak.fetch_max(usage.physical_mem, Ordering::Relaxed);
            }
            thread::sleep(Duration::from_millis(1));
        }
    });

    let _ = black_box(parse_fn());

    stop_signal.store(true, Ordering::Relaxed);
    let _ = sampler.join();

    let peak = peak_mem.load(Ordering::Relaxed);
    peak.saturating_sub(start_mem)
}

fn median(sorted: &[f64]) -> f64 {
    if sorted.len() % 2 == 0 {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
    } else {
        sorted[sorted.len() / 2]
    }
}

/// Returns (median, MAD, iterations) of the wall-clock time in nanoseconds
fn measure<F>(mut parse_fn: F) -> (f64, f64, u32)
where
    F: FnMut() -> bool,
{
    for _ in 0..WARMUP_ITERATIONS {
        let _ = black_box(parse_fn());
    }

    let mut times: Vec<f64> = Vec::new();
    let mut iterations = 0u32;

    let start_measure = Instant::now();
    loop {
        if iterations >= MAX_ITERATIONS {
            break;
        }
        if iterations >= MIN_ITERATIONS && start_measure.elapsed() >= TARGET_TIME {
            break;
        }

        let start = Instant::now();
        let _ = black_box(parse_fn());
        times.push(start.elapsed().as_nanos() as f64);
        iterations += 1;
    }

    if times.is_empty() {
        return (0.0, 0.0, 0);
    }

    times.sort_by(|a, b| a.total_cmp(b));
    let median_time = median(&times);

    let mut deviations: Vec<f64> = times.iter().map(|t| (t - median_time).abs()).collect();
    deviations.sort_by(|a, b| a.total_cmp(b));

    (median_time, median(&deviations), iterations)
}

// ============================================================================
// Main Benchmark Logic
// ============================================================================

fn run_benchmarks() -> std::io::Result<()> {
    fs::create_dir_all("results")?;
    let mut csv_file = File::create(OUTPUT_PATH)?;
    writeln!(
        csv_file,
        "shape,input_length,token_count,steps,median_time_ns,mad_ns,peak_memory_bytes,iterations,success"
    )?;
    println!("✓ Writing results to: {}", OUTPUT_PATH);

    let parser = LLParser::default();

    for shape in SHAPES {
        println!("\n{}", "=".repeat(60));
        println!("Shape: {}", shape.name());
        println!("{}", "=".repeat(60));

        for &size in SIZES {
            let input = shape.generate(size);
            let tokens = tokenize(&input);

            let report = match parser.parse_symbols(&tokens, false) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("  [SKIP] size {}: {}", size, e);
                    continue;
                }
            };
            let success = report.outcome.is_accepted();

            let run = || matches!(parser.parse_symbols(&tokens, false), Ok(r) if r.outcome.is_accepted());
            let peak_mem = measure_peak_memory(run);
            let (median_time, mad, iters) = measure(run);

            let result = BenchmarkResult {
                shape: shape.name(),
                input_length: input.len(),
                token_count: tokens.len(),
                steps: report.steps,
                median_time_ns: median_time,
                mad_ns: mad,
                peak_memory_bytes: peak_mem,
                iterations: iters,
                success,
            };

            let status = if result.success { "✓" } else { "✗" };
            println!(
                "    [{}] {:>8} bytes {:>9} steps: {:>12.0} ns ± {:>8.0} ns ({} iters)",
                status,
                result.input_length,
                result.steps,
                result.median_time_ns,
                result.mad_ns,
                result.iterations
            );

            writeln!(csv_file, "{}", result.to_csv_row())?;
            csv_file.flush()?;
        }
    }

    Ok(())
}

fn main() {
    println!("Predictive Parser Benchmark Tool");
    println!("================================");
    println!("Configuration:");
    println!("  Warmup iterations: {}", WARMUP_ITERATIONS);
    println!("  Min iterations: {}", MIN_ITERATIONS);
    println!("  Max iterations: {}", MAX_ITERATIONS);
    println!("  Target time: {:?}", TARGET_TIME);

    if let Err(e) = run_benchmarks() {
        eprintln!("Error running benchmarks: {}", e);
        return;
    }

    println!("\n✓ Benchmarking complete!");
}
