//! Sharded enumeration across worker threads.
//!
//! The candidates of the first heuristic column are partitioned into
//! contiguous groups, one seeded engine plus private aggregator per group.
//! Workers share only the read-only placement table and the cancellation
//! token; the partial aggregators are merged — cap re-applied — once every
//! worker has returned.

use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;

use crate::aggregator::{black_layout_key, LayoutAggregator};
use crate::error::PuzzleError;
use crate::placements::{PlacementTable, NUM_COLUMNS};
use crate::solver::{CancelToken, Search, SearchStatus};

/// Solutions between progress log lines.
pub const PROGRESS_INTERVAL: u64 = 100_000;

/// Options for an index build run.
pub struct BuildOptions {
    /// Aggregator cap `M`.
    pub cap: u32,
    /// Worker count; `None` uses one worker per CPU.
    pub workers: Option<usize>,
    /// Cooperative cancellation shared by all workers.
    pub cancel: CancelToken,
}

impl Default for BuildOptions {
    fn default() -> BuildOptions {
        BuildOptions {
            cap: LayoutAggregator::DEFAULT_CAP,
            workers: None,
            cancel: CancelToken::new(),
        }
    }
}

/// Result of a build run.
pub struct BuildOutcome {
    pub aggregator: LayoutAggregator,
    /// False when any worker was cancelled before exhausting its shard.
    pub complete: bool,
}

/// Enumerates every tiling and aggregates black layouts, sharded over
/// workers. The caller decides whether an incomplete outcome is usable.
pub fn enumerate_layouts(
    table: &PlacementTable,
    options: &BuildOptions,
) -> Result<BuildOutcome, PuzzleError> {
    let shards = shard_candidates(table, options.workers.unwrap_or_else(num_cpus::get));
    log::info!("sharded first column into {} worker groups", shards.len());

    let progress = AtomicU64::new(0);
    let partials: Vec<Result<(LayoutAggregator, bool), PuzzleError>> = shards
        .par_iter()
        .map(|shard| run_worker(table, shard, options, &progress))
        .collect();

    let mut merged = LayoutAggregator::new(options.cap);
    let mut complete = true;
    for partial in partials {
        let (aggregator, worker_complete) = partial?;
        complete &= worker_complete;
        merged = merged.merge(aggregator);
    }

    log::info!(
        "enumerated {} solutions ({} skipped), {} layouts tracked, {} over the cap",
        merged.solutions(),
        merged.skipped(),
        merged.tracked_layouts(),
        merged.dead_layouts()
    );
    Ok(BuildOutcome {
        aggregator: merged,
        complete,
    })
}

/// The column the sequential engine would branch on first: fewest
/// candidates, ties to the lowest index.
pub(crate) fn first_column(table: &PlacementTable) -> usize {
    (0..NUM_COLUMNS)
        .min_by_key(|&column| (table.candidates(column).len(), column))
        .unwrap()
}

/// Partitions the first column's candidates into at most `workers`
/// contiguous groups.
fn shard_candidates(table: &PlacementTable, workers: usize) -> Vec<Vec<u32>> {
    let candidates = table.candidates(first_column(table));
    let workers = workers.clamp(1, candidates.len().max(1));
    let chunk = candidates.len().div_ceil(workers).max(1);
    candidates.chunks(chunk).map(|group| group.to_vec()).collect()
}

fn run_worker(
    table: &PlacementTable,
    shard: &[u32],
    options: &BuildOptions,
    progress: &AtomicU64,
) -> Result<(LayoutAggregator, bool), PuzzleError> {
    let mut aggregator = LayoutAggregator::new(options.cap);
    let mut violation: Option<PuzzleError> = None;
    let mut complete = true;

    for &seed in shard {
        let mut search = Search::new(table).with_cancel(options.cancel.clone());
        if !search.assume(seed) {
            continue;
        }

        let status = search.run(&mut |chosen| match black_layout_key(table, chosen) {
            Ok(key) => {
                aggregator.observe(key);
                let seen = progress.fetch_add(1, Ordering::Relaxed) + 1;
                if seen % PROGRESS_INTERVAL == 0 {
                    log::info!("{} solutions enumerated", seen);
                }
                true
            }
            Err(err) => {
                violation = Some(err);
                false
            }
        });

        if let Some(err) = violation.take() {
            return Err(err);
        }
        if status == SearchStatus::Cancelled {
            complete = false;
            break;
        }
    }

    Ok((aggregator, complete))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_column_is_the_scarcest() {
        let table = PlacementTable::new().unwrap();
        // every piece orientation covers a corner in exactly one translation,
        // so corner cell 0 has one candidate per orientation: 19 in total
        assert_eq!(first_column(&table), 0);
        assert_eq!(table.candidates(0).len(), 19);
    }

    #[test]
    fn test_shards_partition_the_candidates() {
        let table = PlacementTable::new().unwrap();
        let column = first_column(&table);
        let shards = shard_candidates(&table, 4);

        assert_eq!(shards.len(), 4);
        let flattened: Vec<u32> = shards.iter().flatten().copied().collect();
        assert_eq!(flattened, table.candidates(column));
    }

    #[test]
    fn test_worker_count_is_clamped() {
        let table = PlacementTable::new().unwrap();
        let candidates = table.candidates(first_column(&table)).len();

        assert_eq!(shard_candidates(&table, 0).len(), 1);
        assert!(shard_candidates(&table, candidates * 3).len() <= candidates);
    }

    #[test]
    fn test_cancelled_build_reports_incomplete() {
        let table = PlacementTable::new().unwrap();
        let options = BuildOptions {
            cap: 2,
            workers: Some(2),
            cancel: CancelToken::new(),
        };
        options.cancel.cancel();

        let outcome = enumerate_layouts(&table, &options).unwrap();
        assert!(!outcome.complete);
        assert_eq!(outcome.aggregator.solutions(), 0);
    }
}
