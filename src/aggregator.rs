//! Folding tilings into black-layout counts.
//!
//! Every solution is keyed by the six cells its three black pieces occupy;
//! the aggregator counts tilings per key up to a cap and keeps keys that
//! blew past it in a dead set. Aggregators merge, so parallel workers each
//! fold their own and the driver combines them afterwards.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::PuzzleError;
use crate::pieces::BLACK_CELLS;
use crate::placements::PlacementTable;

/// Canonical identifier of a tiling's black region: six cell indices,
/// ascending. The three black pieces are interchangeable; only the union
/// of their cells matters.
pub type LayoutKey = [u8; BLACK_CELLS];

/// Extracts the black-cell key from a solution's chosen rows.
///
/// A cardinality other than six means the placement table is corrupted and
/// surfaces as [`PuzzleError::InvariantViolation`] rather than being
/// skipped.
pub fn black_layout_key(table: &PlacementTable, chosen: &[u32]) -> Result<LayoutKey, PuzzleError> {
    let mut cells: Vec<u8> = Vec::with_capacity(BLACK_CELLS);
    for &row in chosen {
        if table.piece_of(row).is_black() {
            cells.extend_from_slice(table.placement(row).cells());
        }
    }

    if cells.len() != BLACK_CELLS {
        return Err(PuzzleError::InvariantViolation { found: cells.len() });
    }

    cells.sort_unstable();
    let mut key = [0u8; BLACK_CELLS];
    key.copy_from_slice(&cells);
    Ok(key)
}

/// Per-key tiling counter with a cap and a dead set.
pub struct LayoutAggregator {
    cap: u32,
    counts: FxHashMap<LayoutKey, u32>,
    dead: FxHashSet<LayoutKey>,
    skipped: u64,
    solutions: u64,
}

impl LayoutAggregator {
    /// Default cap: layouts with more tilings than this stop being counted.
    /// A cap of 2 suffices for the unique-layout build.
    pub const DEFAULT_CAP: u32 = 100;

    pub fn new(cap: u32) -> LayoutAggregator {
        LayoutAggregator {
            cap,
            counts: FxHashMap::default(),
            dead: FxHashSet::default(),
            skipped: 0,
            solutions: 0,
        }
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// Total solutions observed, including skipped ones.
    pub fn solutions(&self) -> u64 {
        self.solutions
    }

    /// Solutions discarded because their key was already dead.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Records one tiling for `key`.
    ///
    /// A key found already at the cap moves to the dead set and stops
    /// counting; later sightings only bump the skipped tally.
    pub fn observe(&mut self, key: LayoutKey) {
        self.solutions += 1;

        if self.dead.contains(&key) {
            self.skipped += 1;
            return;
        }

        match self.counts.get_mut(&key) {
            Some(count) if *count >= self.cap => {
                self.counts.remove(&key);
                self.dead.insert(key);
                self.skipped += 1;
            }
            Some(count) => *count += 1,
            None if self.cap == 0 => {
                self.dead.insert(key);
                self.skipped += 1;
            }
            None => {
                self.counts.insert(key, 1);
            }
        }
    }

    /// Number of keys still being counted.
    pub fn tracked_layouts(&self) -> usize {
        self.counts.len()
    }

    /// Number of keys that exceeded the cap.
    pub fn dead_layouts(&self) -> usize {
        self.dead.len()
    }

    pub fn count(&self, key: &LayoutKey) -> Option<u32> {
        self.counts.get(key).copied()
    }

    pub fn is_dead(&self, key: &LayoutKey) -> bool {
        self.dead.contains(key)
    }

    /// Keys realised by exactly one tiling, sorted.
    pub fn unique_layouts(&self) -> Vec<LayoutKey> {
        let mut keys: Vec<LayoutKey> = self
            .counts
            .iter()
            .filter(|&(_, &count)| count == 1)
            .map(|(&key, _)| key)
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Merges a partial aggregator produced by another worker.
    ///
    /// Counts are summed and the cap re-checked: a key may stay under the
    /// cap in every worker yet exceed it in total, and such keys must not
    /// surface as unique.
    pub fn merge(mut self, other: LayoutAggregator) -> LayoutAggregator {
        self.solutions += other.solutions;
        self.skipped += other.skipped;

        for key in other.dead {
            self.counts.remove(&key);
            self.dead.insert(key);
        }

        for (key, count) in other.counts {
            if self.dead.contains(&key) {
                continue;
            }
            let total = self.counts.get(&key).copied().unwrap_or(0) + count;
            if total > self.cap {
                self.counts.remove(&key);
                self.dead.insert(key);
            } else {
                self.counts.insert(key, total);
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::CATALOGUE;

    const KEY_A: LayoutKey = [0, 1, 2, 3, 4, 5];
    const KEY_B: LayoutKey = [10, 11, 12, 20, 21, 30];

    #[test]
    fn test_counts_accumulate_until_cap() {
        let mut aggregator = LayoutAggregator::new(100);
        aggregator.observe(KEY_A);
        aggregator.observe(KEY_A);
        aggregator.observe(KEY_B);

        assert_eq!(aggregator.count(&KEY_A), Some(2));
        assert_eq!(aggregator.count(&KEY_B), Some(1));
        assert_eq!(aggregator.solutions(), 3);
        assert_eq!(aggregator.unique_layouts(), vec![KEY_B]);
    }

    #[test]
    fn test_cap_one_kills_on_second_sighting() {
        let mut aggregator = LayoutAggregator::new(1);
        aggregator.observe(KEY_A);
        assert_eq!(aggregator.count(&KEY_A), Some(1));

        aggregator.observe(KEY_A);
        assert!(aggregator.is_dead(&KEY_A));
        assert_eq!(aggregator.count(&KEY_A), None);
        assert_eq!(aggregator.skipped(), 1);

        aggregator.observe(KEY_A);
        assert_eq!(aggregator.skipped(), 2);
        assert!(aggregator.unique_layouts().is_empty());
    }

    #[test]
    fn test_merge_reapplies_cap() {
        // each worker saw the key once; combined it exceeds cap 1
        let mut left = LayoutAggregator::new(1);
        left.observe(KEY_A);
        left.observe(KEY_B);
        let mut right = LayoutAggregator::new(1);
        right.observe(KEY_A);

        let merged = left.merge(right);
        assert!(merged.is_dead(&KEY_A));
        assert_eq!(merged.count(&KEY_A), None);
        assert_eq!(merged.unique_layouts(), vec![KEY_B]);
        assert_eq!(merged.solutions(), 3);
    }

    #[test]
    fn test_merge_propagates_dead_sets() {
        let mut left = LayoutAggregator::new(1);
        left.observe(KEY_A);

        let mut right = LayoutAggregator::new(1);
        right.observe(KEY_A);
        right.observe(KEY_A);
        assert!(right.is_dead(&KEY_A));

        let merged = left.merge(right);
        assert!(merged.is_dead(&KEY_A));
        assert_eq!(merged.count(&KEY_A), None);
    }

    #[test]
    fn test_merge_under_cap_sums_counts() {
        let mut left = LayoutAggregator::new(100);
        left.observe(KEY_A);
        let mut right = LayoutAggregator::new(100);
        right.observe(KEY_A);

        let merged = left.merge(right);
        assert_eq!(merged.count(&KEY_A), Some(2));
        assert!(merged.unique_layouts().is_empty());
    }

    #[test]
    fn test_wrong_black_cardinality_is_an_error() {
        let table = PlacementTable::new().unwrap();

        // a 1×3 and a 1×2 but no 1×1: five black cells
        let k_1x3 = CATALOGUE.iter().position(|p| p.name == "K_1x3").unwrap();
        let k_1x2 = CATALOGUE.iter().position(|p| p.name == "K_1x2").unwrap();
        let first_of = |piece: usize| {
            (0..table.len() as u32)
                .find(|&row| table.placement(row).piece as usize == piece)
                .unwrap()
        };

        let chosen = vec![first_of(k_1x3), first_of(k_1x2)];
        let err = black_layout_key(&table, &chosen).unwrap_err();
        assert!(matches!(err, PuzzleError::InvariantViolation { found: 5 }));
    }

    #[test]
    fn test_key_extraction_sorts_cells() {
        let table = PlacementTable::new().unwrap();
        let black_rows: Vec<u32> = (0..table.len() as u32)
            .filter(|&row| table.piece_of(row).is_black())
            .collect();

        // pick one disjoint placement per black piece
        let mut chosen = Vec::new();
        let mut covered = 0u128;
        for &id in &crate::pieces::BLACK_PIECES {
            let row = black_rows
                .iter()
                .find(|&&row| {
                    table.placement(row).piece as usize == id
                        && table.placement(row).mask & covered == 0
                })
                .copied()
                .unwrap();
            covered |= table.placement(row).mask;
            chosen.push(row);
        }
        chosen.reverse();

        let key = black_layout_key(&table, &chosen).unwrap();
        assert!(key.windows(2).all(|w| w[0] < w[1]));
    }
}
