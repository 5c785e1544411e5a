//! Mondrian Blocks puzzle tool.
//!
//! Enumerates all tilings of the 8×8 board by the eleven-piece catalogue,
//! builds an index of black-piece layouts with exactly one tiling, samples
//! random puzzles from it, and scores layout difficulty.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use flexi_logger::Logger;
use rand::seq::SliceRandom;

use mondrian::aggregator::{black_layout_key, LayoutAggregator};
use mondrian::board::render_layout;
use mondrian::difficulty::{score_layout, Difficulty};
use mondrian::error::PuzzleError;
use mondrian::index;
use mondrian::parallel::{enumerate_layouts, BuildOptions, PROGRESS_INTERVAL};
use mondrian::placements::{PlacementTable, NUM_COLUMNS};
use mondrian::report::{load_report, save_report, ReportCollector};
use mondrian::solver::{CancelToken, Search, SearchStatus};

/// Enumerates 8×8 Mondrian Blocks tilings and generates unique puzzles.
#[derive(Parser)]
#[command(name = "mondrian")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level filter (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Enumerate every tiling and write the unique-layout index.
    Build {
        /// Output index file.
        out_file: PathBuf,
        /// Stop counting a layout once it has this many tilings.
        cap: Option<u32>,
        /// Also write a layout report JSON (forces a sequential run).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Number of search workers (default: one per CPU).
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Print random layouts drawn from an index file.
    Sample {
        /// Index file written by `build`.
        in_file: PathBuf,
        /// How many layouts to draw.
        n: Option<usize>,
    },
    /// Score every combination in a layout report.
    Analyze {
        /// Report file written by `build --report`.
        in_file: PathBuf,
    },
    /// Survey layout diversity with a randomised search order.
    Diversity {
        /// Number of solutions to enumerate.
        limit: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = Logger::try_with_env_or_str(&cli.log_level)?
        .log_to_stderr()
        .start()?;

    match cli.command {
        Command::Build {
            out_file,
            cap,
            report,
            workers,
        } => run_build(&out_file, cap, report.as_deref(), workers),
        Command::Sample { in_file, n } => run_sample(&in_file, n.unwrap_or(1)),
        Command::Analyze { in_file } => run_analyze(&in_file),
        Command::Diversity { limit } => run_diversity(limit.unwrap_or(100_000)),
    }
}

/// Runs the enumeration and writes the unique-layout index.
fn run_build(
    out_file: &Path,
    cap: Option<u32>,
    report: Option<&Path>,
    workers: Option<usize>,
) -> Result<()> {
    let cap = cap.unwrap_or(LayoutAggregator::DEFAULT_CAP);
    let table = PlacementTable::new()?;
    log::info!("placement table ready: {} rows", table.len());

    let aggregator = match report {
        Some(report_path) => build_with_report(&table, cap, report_path)?,
        None => {
            let options = BuildOptions {
                cap,
                workers,
                cancel: CancelToken::new(),
            };
            let outcome = enumerate_layouts(&table, &options)?;
            if !outcome.complete {
                return Err(PuzzleError::Cancelled.into());
            }
            outcome.aggregator
        }
    };

    let unique = aggregator.unique_layouts();
    index::save_index(out_file, &unique)
        .with_context(|| format!("failed to write index {}", out_file.display()))?;

    log::info!("wrote {} unique layouts to {}", unique.len(), out_file.display());
    println!(
        "Indexed {} unique layouts from {} solutions (cap {})",
        unique.len(),
        aggregator.solutions(),
        cap
    );
    Ok(())
}

/// Sequential build that also collects the layout report.
fn build_with_report(
    table: &PlacementTable,
    cap: u32,
    report_path: &Path,
) -> Result<LayoutAggregator> {
    let mut aggregator = LayoutAggregator::new(cap);
    let mut collector = ReportCollector::new();
    let mut violation: Option<PuzzleError> = None;

    Search::new(table).run(&mut |chosen| match black_layout_key(table, chosen) {
        Ok(key) => {
            collector.record(table, chosen, key);
            aggregator.observe(key);
            if aggregator.solutions() % PROGRESS_INTERVAL == 0 {
                log::info!("{} solutions enumerated", aggregator.solutions());
            }
            true
        }
        Err(err) => {
            violation = Some(err);
            false
        }
    });
    if let Some(err) = violation {
        return Err(err.into());
    }

    let report = collector.finish();
    save_report(report_path, &report)
        .with_context(|| format!("failed to write report {}", report_path.display()))?;
    log::info!(
        "wrote layout report with {} combinations to {}",
        report.metadata.unique_black_combinations,
        report_path.display()
    );
    Ok(aggregator)
}

/// Loads the index and prints random layouts.
fn run_sample(in_file: &Path, n: usize) -> Result<()> {
    let layouts = index::load_index(in_file)
        .with_context(|| format!("failed to load index {}", in_file.display()))?;
    if layouts.is_empty() {
        bail!("index {} holds no layouts", in_file.display());
    }
    log::info!("loaded {} unique layouts", layouts.len());

    let mut rng = rand::rng();
    for _ in 0..n {
        if let Some(layout) = index::sample(&layouts, &mut rng) {
            println!("Black-block layout (cell indices): {:?}", layout);
            println!("{}", render_layout(layout));
        }
    }
    Ok(())
}

/// Scores every combination in a layout report and prints a summary.
fn run_analyze(in_file: &Path) -> Result<()> {
    let report = load_report(in_file)
        .with_context(|| format!("failed to load report {}", in_file.display()))?;
    let combinations = &report.black_piece_combinations;
    if combinations.is_empty() {
        bail!("report {} holds no combinations", in_file.display());
    }

    println!("Analyzing {} black-block combinations...", combinations.len());

    let mut totals = Vec::with_capacity(combinations.len());
    let mut histogram: BTreeMap<Difficulty, usize> = BTreeMap::new();

    for combination in combinations {
        let key = combination.layout_key()?;
        let score = score_layout(&key);
        totals.push(score.total);
        *histogram.entry(score.difficulty).or_insert(0) += 1;

        let factors = &score.factors;
        println!();
        println!("Combination #{}", combination.combination_id);
        println!("  score {:.2} ({})", score.total, score.difficulty);
        println!(
            "  spread {:.2} | fragmentation {:.2} | edge proximity {:.2}",
            factors.spread, factors.fragmentation, factors.edge_proximity
        );
        println!(
            "  connectivity {:.2} | symmetry {:.2} | corners {:.2}",
            factors.connectivity, factors.symmetry, factors.corner_occupation
        );
    }

    let count = totals.len() as f64;
    let average: f64 = totals.iter().sum::<f64>() / count;
    let highest = totals.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let lowest = totals.iter().cloned().fold(f64::INFINITY, f64::min);

    println!();
    println!(
        "Overall: {} combinations, average {:.2}, max {:.2}, min {:.2}",
        combinations.len(),
        average,
        highest,
        lowest
    );
    for (difficulty, bucket_count) in &histogram {
        let percentage = *bucket_count as f64 / count * 100.0;
        println!("  {}: {} ({:.1}%)", difficulty, bucket_count, percentage);
    }
    Ok(())
}

/// Enumerates with a shuffled column order and reports layout diversity.
fn run_diversity(limit: u64) -> Result<()> {
    let table = PlacementTable::new()?;

    let mut order: Vec<u8> = (0..NUM_COLUMNS as u8).collect();
    order.shuffle(&mut rand::rng());

    let mut aggregator = LayoutAggregator::new(LayoutAggregator::DEFAULT_CAP);
    let mut violation: Option<PuzzleError> = None;
    let mut seen = 0u64;

    let status = Search::new(&table).with_column_order(order).run(&mut |chosen| {
        match black_layout_key(&table, chosen) {
            Ok(key) => {
                if !aggregator.is_dead(&key) && aggregator.count(&key).is_none() {
                    log::info!(
                        "new layout #{}: {:?}",
                        aggregator.tracked_layouts() + 1,
                        key
                    );
                }
                aggregator.observe(key);
                seen += 1;
                seen < limit
            }
            Err(err) => {
                violation = Some(err);
                false
            }
        }
    });
    if let Some(err) = violation {
        return Err(err.into());
    }

    let ending = match status {
        SearchStatus::Exhausted => "search exhausted",
        _ => "limit reached",
    };
    println!("Processed {} solutions ({})", seen, ending);
    println!(
        "Distinct layouts: {} tracked, {} over the cap",
        aggregator.tracked_layouts(),
        aggregator.dead_layouts()
    );
    Ok(())
}
