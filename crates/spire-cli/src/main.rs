//! spire: distributed dominant-eigenvalue solver.
//!
//! Runs the power iteration on the built-in Hilbert-type example matrix
//! `A(i, j) = 1 / (i + j + 1)`, decomposed over a cohort of workers, and
//! reports the eigenvalue, residual norms, and iteration-phase timing from
//! rank 0.

use std::process::ExitCode;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spire_collective::{run_cohort, Rank};
use spire_eigen::{
    hilbert_entry, power_iterate, residual_norms, BlockLayout, ColumnBlock, DistVector,
    PowerConfig, ResidualNorms, Termination,
};

const USAGE: &str = "Usage: spire <n> <tol> <itmax> [workers] [--json]
  with integer n > 0, real tol > 0, and integer itmax > 0;
  workers defaults to the available CPU parallelism and must divide n";

#[derive(Debug, Clone, Copy)]
struct Args {
    n: usize,
    tolerance: f64,
    max_iterations: usize,
    workers: usize,
    json: bool,
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map(usize::from).unwrap_or(1)
}

/// Accepts the same inputs the solver historically did: `n` may be written
/// in any real-number syntax (`1e3`) but must denote a positive integer.
fn parse_size(text: &str) -> Result<usize, String> {
    let v: f64 = text.parse().map_err(|_| format!("n must be a number, got {text:?}"))?;
    if !v.is_finite() || v <= 0.0 {
        return Err(format!("n must be positive, got {text}"));
    }
    if v.fract() != 0.0 {
        return Err(format!("n must be an integer, got n = {v}"));
    }
    Ok(v as usize)
}

fn parse_args(argv: &[String]) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut json = false;
    for arg in argv {
        if arg == "--json" {
            json = true;
        } else {
            positional.push(arg.clone());
        }
    }
    if positional.len() < 3 || positional.len() > 4 {
        return Err(format!("expected 3 or 4 arguments, got {}", positional.len()));
    }

    let n = parse_size(&positional[0])?;
    let tolerance: f64 = positional[1]
        .parse()
        .map_err(|_| format!("tol must be a real number, got {:?}", positional[1]))?;
    if !(tolerance > 0.0) {
        return Err(format!("tol must be positive, got {}", positional[1]));
    }
    let max_iterations: usize = positional[2]
        .parse()
        .map_err(|_| format!("itmax must be an integer, got {:?}", positional[2]))?;
    if max_iterations == 0 {
        return Err("itmax must be positive".to_string());
    }
    let workers = match positional.get(3) {
        Some(text) => {
            let w: usize =
                text.parse().map_err(|_| format!("workers must be an integer, got {text:?}"))?;
            if w == 0 {
                return Err("workers must be positive".to_string());
            }
            w
        }
        None => default_workers(),
    };

    Ok(Args { n, tolerance, max_iterations, workers, json })
}

/// What rank 0 carries back out of the cohort for reporting.
struct WorkerOutput {
    eigenvalue: f64,
    iterations: usize,
    termination: Termination,
    residual: ResidualNorms,
    seconds: f64,
    eigenvector: Option<Vec<f64>>,
    matrix: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
struct RunReport {
    n: usize,
    workers: usize,
    block_len: usize,
    tolerance: f64,
    max_iterations: usize,
    iterations: usize,
    termination: String,
    eigenvalue: f64,
    residual_abs: f64,
    residual_rel: f64,
    seconds: f64,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // Validate the partition before any worker starts numerical work.
    let layout = BlockLayout::new(args.n, args.workers)?;
    info!(
        n = layout.n(),
        workers = layout.workers(),
        block_len = layout.block_len(),
        "starting distributed solve"
    );

    let (n, workers) = (args.n, args.workers);
    let config =
        PowerConfig::default().with_tolerance(args.tolerance).with_max_iterations(args.max_iterations);

    let outputs = run_cohort(workers, move |comm| -> spire_eigen::Result<WorkerOutput> {
        let layout = BlockLayout::new(n, workers)?;
        let rank = comm.rank();
        debug!(rank = %rank, size = comm.size(), "worker online");

        let block = ColumnBlock::from_entries(&layout, rank, hilbert_entry);
        let guess = DistVector::default_guess(&layout);

        // Time the iteration phase only, bracketed by barriers so every
        // worker measures the same window.
        comm.barrier()?;
        let start = Instant::now();
        let solution = power_iterate(&comm, &block, guess, &config)?;
        comm.barrier()?;
        let seconds = start.elapsed().as_secs_f64();

        let residual = residual_norms(&comm, &solution)?;
        let eigenvector = if layout.n() < 25 {
            comm.gather(&solution.eigenvector.local, Rank::ROOT)?
        } else {
            None
        };
        let matrix =
            if layout.n() <= 4 { comm.gather(block.data(), Rank::ROOT)? } else { None };

        Ok(WorkerOutput {
            eigenvalue: solution.eigenvalue,
            iterations: solution.iterations,
            termination: solution.termination,
            residual,
            seconds,
            eigenvector,
            matrix,
        })
    })?;

    report(&args, &layout, &outputs[0])?;
    Ok(())
}

fn report(
    args: &Args,
    layout: &BlockLayout,
    out: &WorkerOutput,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.json {
        let report = RunReport {
            n: layout.n(),
            workers: layout.workers(),
            block_len: layout.block_len(),
            tolerance: args.tolerance,
            max_iterations: args.max_iterations,
            iterations: out.iterations,
            termination: out.termination.to_string(),
            eigenvalue: out.eigenvalue,
            residual_abs: out.residual.absolute,
            residual_rel: out.residual.relative,
            seconds: out.seconds,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(matrix) = &out.matrix {
        println!("A =");
        print_matrix(layout.n(), matrix);
        println!();
    }
    if let Some(x) = &out.eigenvector {
        println!("x =");
        for v in x {
            println!("{v:26.16e}");
        }
        println!();
    }

    println!("n = {}, p = {}, l_n = {}", layout.n(), layout.workers(), layout.block_len());
    println!(
        "tol = {:24.16e}, itmax = {}, iter = {} ({})",
        args.tolerance, args.max_iterations, out.iterations, out.termination
    );
    println!("lambda          = {:24.16e}", out.eigenvalue);
    println!("resnormabs      = {:24.16e}", out.residual.absolute);
    println!("resnormrel      = {:24.16e}", out.residual.relative);
    println!("time in seconds = {:11.2}", out.seconds);
    Ok(())
}

/// The gathered blocks concatenate, in rank order, into the full
/// column-major matrix.
fn print_matrix(n: usize, data: &[f64]) {
    for i in 0..n {
        let mut row = String::new();
        for j in 0..n {
            row.push_str(&format!("{:10.4}", data[i + j * n]));
        }
        println!("{row}");
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spire=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
