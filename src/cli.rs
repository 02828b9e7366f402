//! Command-line interface components.

use crate::config::PirataConfig;
use crate::error::Severity;
use crate::models::ProcessingStats;
use crate::processor::source::discover_files;
use crate::processor::{BatchOutcome, BatchProcessor};
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "pirata")]
#[command(about = "Decode PIRATA buoy ASCII files into per-station time series tables")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// PIRATA .ascii / .ascii.gz files, or directories to search for them
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Maximum number of files decoded concurrently (defaults to the CPU count)
    #[arg(short = 'j', long = "workers")]
    pub workers: Option<usize>,

    /// Keep station tables in join order instead of sorting by time
    #[arg(long)]
    pub no_sort: bool,

    /// Stop at the first file that cannot be decoded
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the header metadata of every decoded file
    #[arg(long)]
    pub metadata: bool,

    /// Print at most this many decode issues
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub issues: usize,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    pub fn to_config(&self) -> PirataConfig {
        let mut config = PirataConfig::default();
        if let Some(workers) = self.workers {
            config = config.with_max_concurrent_files(workers);
        }
        if self.no_sort {
            config = config.without_sorting();
        }
        if self.fail_fast {
            config = config.with_fail_fast();
        }
        config
    }
}

/// Set up structured logging based on CLI arguments
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pirata_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Decode the requested files and print the report
pub async fn run(args: Args) -> Result<ProcessingStats> {
    let files = discover_files(&args.files).context("Failed to collect input files")?;
    if files.is_empty() {
        anyhow::bail!("No PIRATA files found in the given paths");
    }

    if !args.quiet {
        println!(
            "{} {} files",
            "Decoding".bright_green().bold(),
            files.len().to_string().bright_white().bold()
        );
    }

    let processor = BatchProcessor::new(args.to_config())?.with_progress(!args.quiet);
    let outcome = processor.process(&files).await?;

    if !args.quiet {
        print_report(&args, &outcome);
    }

    Ok(outcome.stats)
}

fn print_report(args: &Args, outcome: &BatchOutcome) {
    if args.metadata {
        println!("\n{}", "Files".bright_green().bold());
        for file in &outcome.files {
            let meta = &file.metadata;
            println!(
                "  {} {}",
                file.path.display().to_string().bright_cyan(),
                format!("({} rows)", file.rows).bright_black()
            );
            println!(
                "    units: {}  missing: {}  blocks: {}",
                meta.units.as_deref().unwrap_or("-"),
                meta.missing_value_token.as_deref().unwrap_or("-"),
                meta.block_count()
            );
            if !meta.extra_header_notes.is_empty() {
                println!("    notes: {}", meta.extra_header_notes.join(", "));
            }
            if let Some(location) = &meta.location {
                println!(
                    "    location: {:.3}, {:.3}",
                    location.latitude, location.longitude
                );
            }
        }
    }

    println!("\n{}", "Stations".bright_green().bold());
    for table in &outcome.stations {
        println!(
            "  {} {} rows, {} columns ({})",
            table.station.bright_cyan().bold(),
            table.frame.height().to_string().bright_white(),
            table.frame.width().saturating_sub(1).to_string().bright_white(),
            table.variables.join(", ")
        );
    }

    if args.issues > 0 && !outcome.issues.is_empty() {
        println!("\n{}", "Issues".bright_yellow().bold());
        for entry in outcome.issues.iter().take(args.issues) {
            let label = match entry.issue.severity() {
                Severity::Warning => "warning".yellow(),
                Severity::Error => "error".red(),
            };
            println!("  {} {}: {}", label, entry.path.display(), entry.issue);
        }
        if outcome.issues.len() > args.issues {
            println!(
                "  {}",
                format!("... {} more", outcome.issues.len() - args.issues).bright_black()
            );
        }
    }

    let stats = &outcome.stats;
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files decoded:".bright_cyan(),
        stats.files_processed.to_string().bright_white()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
        for path in &stats.failed_paths {
            println!("    {}", path.display().to_string().red());
        }
    }
    println!(
        "  {} {}",
        "Total rows:".bright_cyan(),
        stats.total_rows.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Issues:".bright_cyan(),
        stats.issues.to_string().bright_white()
    );
}
