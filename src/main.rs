use clap::{Parser, Subcommand};
use std::process;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use psieve::{DEFAULT_SEGMENT_WIDTH, SieveConfig, TracingProgress, storage, verify};

#[derive(Parser)]
#[command(name = "psieve")]
#[command(about = "Parallel segmented Sieve of Eratosthenes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Find all prime numbers up to a given limit")]
    Primes {
        #[arg(help = "The upper limit to search for primes (inclusive)")]
        limit: u64,
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_SEGMENT_WIDTH,
            help = "Numbers per segment"
        )]
        segment_width: u64,
        #[arg(
            short,
            long,
            help = "Number of worker threads (defaults to the CPU count)"
        )]
        workers: Option<usize>,
        #[arg(long, help = "Save the primes to the data directory")]
        save: bool,
        #[arg(
            short,
            long,
            requires = "save",
            help = "Save primes in binary format (8 bytes per prime, little-endian)"
        )]
        binary: bool,
    },
    #[command(about = "Sieve up to a limit and check every value against GMP")]
    Verify {
        #[arg(help = "The upper limit to verify (inclusive)")]
        limit: u64,
        #[arg(short, long, default_value_t = DEFAULT_SEGMENT_WIDTH, help = "Numbers per segment")]
        segment_width: u64,
        #[arg(short, long, help = "Number of worker threads (defaults to the CPU count)")]
        workers: Option<usize>,
        #[arg(long, default_value = "20", help = "Stop listing after this many mismatches")]
        max_mismatches: usize,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let ok = match cli.command {
        Commands::Primes {
            limit,
            segment_width,
            workers,
            save,
            binary,
        } => run_primes(config(limit, segment_width, workers), save, binary),
        Commands::Verify {
            limit,
            segment_width,
            workers,
            max_mismatches,
        } => run_verify(config(limit, segment_width, workers), max_mismatches),
    };

    if !ok {
        process::exit(1);
    }
}

/// Worker default is resolved here, never inside the sieve
fn config(limit: u64, segment_width: u64, workers: Option<usize>) -> SieveConfig {
    let workers = workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    });

    SieveConfig::new(limit)
        .with_segment_width(segment_width)
        .with_workers(workers)
}

fn run_primes(config: SieveConfig, save: bool, binary: bool) -> bool {
    let start = Instant::now();

    println!(
        "Finding primes up to {} (segment width {}, {} workers)...",
        config.limit, config.segment_width, config.workers
    );

    let primes = match psieve::compute_primes_with(&config, &TracingProgress) {
        Ok(primes) => primes,
        Err(e) => {
            eprintln!("Error: {}", e);
            return false;
        }
    };

    let sieve_done = start.elapsed();
    println!(
        "\nSieve finished: {}us ({:.2}ms)",
        sieve_done.as_micros(),
        sieve_done.as_micros() as f64 / 1000.0
    );

    if save {
        let saved = storage::data_dir().and_then(|dir| {
            if binary {
                storage::save_primes_binary(&dir, &primes)
            } else {
                storage::save_primes_text(&dir, &primes)
            }
        });
        match saved {
            Ok(path) => println!("Saved all primes to {}", path.display()),
            Err(e) => eprintln!("Error saving primes: {}", e),
        }
    }

    println!("\nTotal: {} primes found", primes.len());
    if let Some(largest) = primes.last() {
        println!("Largest: {}", largest);
    }
    if let Some((rss_mb, peak_mb)) = storage::get_process_memory_mb() {
        println!("Memory: {:.1}MB resident, {:.1}MB peak", rss_mb, peak_mb);
    }

    let duration_us = start.elapsed().as_micros();
    println!(
        "Total execution time: {}us ({:.2}ms)",
        duration_us,
        duration_us as f64 / 1000.0
    );

    if let Err(e) = storage::data_dir()
        .and_then(|dir| storage::log_execution(&dir, "primes", &config, primes.len(), duration_us))
    {
        eprintln!("Warning: Failed to log execution: {}", e);
    }

    true
}

fn run_verify(config: SieveConfig, max_mismatches: usize) -> bool {
    let start = Instant::now();

    let primes = match psieve::compute_primes_with(&config, &TracingProgress) {
        Ok(primes) => primes,
        Err(e) => {
            eprintln!("Error: {}", e);
            return false;
        }
    };

    println!("Checking {} values against GMP...", config.limit as u128 + 1);
    let report = verify::audit(&primes, config.limit, max_mismatches);

    for mismatch in &report.mismatches {
        eprintln!("Mismatch: {:?}", mismatch);
    }

    let duration_us = start.elapsed().as_micros();
    println!(
        "Checked {} values, {} primes, {} mismatches in {}us ({:.2}ms)",
        report.checked,
        primes.len(),
        report.mismatches.len(),
        duration_us,
        duration_us as f64 / 1000.0
    );

    if let Err(e) = storage::data_dir()
        .and_then(|dir| storage::log_execution(&dir, "verify", &config, primes.len(), duration_us))
    {
        eprintln!("Warning: Failed to log execution: {}", e);
    }

    report.is_ok()
}
