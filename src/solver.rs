//! Bitmask exact-cover engine.
//!
//! Algorithm X over the placement table, implemented as backtracking on a
//! 75-bit cover mask rather than a dancing-links node graph. Word-sized
//! AND/OR operations replace pointer chasing, allocation stays flat, and
//! the search state is trivially copyable for parallel forking.
//!
//! The engine surfaces nothing but solutions: it never logs and never
//! allocates per solution. Callers observe the search through a visitor
//! that receives a read-only view of the chosen rows and answers whether
//! to continue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::aggregator::LayoutKey;
use crate::pieces::NUM_PIECES;
use crate::placements::{PlacementTable, FULL_COVER, NUM_COLUMNS};

/// Cooperative cancellation shared between a driver and its workers.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Requests cancellation; running searches notice at their next
    /// recursion step.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How a search run ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchStatus {
    /// Every branch was explored.
    Exhausted,
    /// The visitor asked to stop; all frames unwound cleanly.
    Stopped,
    /// The cancellation token fired; enumeration is incomplete.
    Cancelled,
}

/// Backtracking search over a shared, read-only placement table.
pub struct Search<'a> {
    table: &'a PlacementTable,
    column_order: Vec<u8>,
    cancel: Option<CancelToken>,
    covered: u128,
    chosen: Vec<u32>,
}

impl<'a> Search<'a> {
    pub fn new(table: &'a PlacementTable) -> Search<'a> {
        Search {
            table,
            column_order: (0..NUM_COLUMNS as u8).collect(),
            cancel: None,
            covered: 0,
            chosen: Vec::with_capacity(NUM_PIECES),
        }
    }

    /// Overrides the column scan order.
    ///
    /// The default ascending order makes enumeration deterministic for a
    /// given table. A shuffled order is used by the diversity survey to
    /// reach different regions of the solution space first; the canonical
    /// build never randomises.
    pub fn with_column_order(mut self, order: Vec<u8>) -> Search<'a> {
        self.column_order = order;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Search<'a> {
        self.cancel = Some(token);
        self
    }

    /// Pre-places a row before the search starts.
    ///
    /// Returns `false` if the row conflicts with rows already assumed.
    /// Used to shard the build across workers and to restrict enumeration
    /// to a fixed black layout.
    pub fn assume(&mut self, row: u32) -> bool {
        let mask = self.table.placement(row).mask;
        if self.covered & mask != 0 {
            return false;
        }
        self.covered |= mask;
        self.chosen.push(row);
        true
    }

    /// Runs the search, invoking `visitor` once per complete tiling.
    ///
    /// The visitor returns `true` to continue enumerating or `false` to
    /// stop; stopping unwinds all frames and is not an error.
    pub fn run<F>(&mut self, visitor: &mut F) -> SearchStatus
    where
        F: FnMut(&[u32]) -> bool,
    {
        self.recurse(visitor)
    }

    /// Picks the uncovered column with the fewest compatible rows.
    ///
    /// Ties break towards the earlier position in the scan order. A zero
    /// count short-circuits the scan: the branch is already dead.
    fn choose_column(&self) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;

        for &column in &self.column_order {
            let column = column as usize;
            if self.covered >> column & 1 == 1 {
                continue;
            }

            let compatible = self
                .table
                .candidates(column)
                .iter()
                .filter(|&&row| self.table.placement(row).mask & self.covered == 0)
                .count();
            if compatible == 0 {
                return Some((column, 0));
            }
            if best.map_or(true, |(_, count)| compatible < count) {
                best = Some((column, compatible));
            }
        }

        best
    }

    fn recurse<F>(&mut self, visitor: &mut F) -> SearchStatus
    where
        F: FnMut(&[u32]) -> bool,
    {
        if let Some(token) = &self.cancel {
            if token.is_cancelled() {
                return SearchStatus::Cancelled;
            }
        }

        if self.covered == FULL_COVER {
            return if visitor(&self.chosen) {
                SearchStatus::Exhausted
            } else {
                SearchStatus::Stopped
            };
        }

        let Some((column, compatible)) = self.choose_column() else {
            return SearchStatus::Exhausted;
        };
        if compatible == 0 {
            return SearchStatus::Exhausted;
        }

        for &row in self.table.candidates(column) {
            let mask = self.table.placement(row).mask;
            if mask & self.covered != 0 {
                continue;
            }

            self.covered |= mask;
            self.chosen.push(row);
            let status = self.recurse(visitor);
            self.covered ^= mask;
            self.chosen.pop();

            if status != SearchStatus::Exhausted {
                return status;
            }
        }

        SearchStatus::Exhausted
    }
}

/// Counts tilings whose black region equals `key`, up to `limit`.
///
/// The three black pieces are interchangeable at the key level, so every
/// way they can exactly cover the six key cells is seeded in turn and the
/// completions summed. Verifies uniqueness claims from the index.
pub fn count_layout_tilings(table: &PlacementTable, key: &LayoutKey, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }

    let mut key_mask = 0u64;
    for &cell in key {
        key_mask |= 1 << cell;
    }

    // per black piece, the placements that stay inside the key cells
    let candidates: Vec<Vec<u32>> = table
        .pieces()
        .iter()
        .enumerate()
        .filter(|(_, piece)| piece.is_black())
        .map(|(id, _)| {
            (0..table.len() as u32)
                .filter(|&row| {
                    let placement = table.placement(row);
                    placement.piece as usize == id && placement.cell_mask() & !key_mask == 0
                })
                .collect()
        })
        .collect();

    let mut total = 0u64;
    for &a in &candidates[0] {
        for &b in &candidates[1] {
            for &c in &candidates[2] {
                let union = table.placement(a).cell_mask()
                    | table.placement(b).cell_mask()
                    | table.placement(c).cell_mask();
                // six cells from 3+2+1 pieces: equality implies disjointness
                if union != key_mask {
                    continue;
                }

                let mut search = Search::new(table);
                if !(search.assume(a) && search.assume(b) && search.assume(c)) {
                    continue;
                }

                let remaining = limit - total;
                let mut found = 0u64;
                search.run(&mut |_| {
                    found += 1;
                    found < remaining
                });

                total += found;
                if total >= limit {
                    return total;
                }
            }
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::black_layout_key;
    use crate::pieces::CATALOGUE;

    /// Collects up to `limit` solutions.
    fn first_solutions(table: &PlacementTable, limit: usize) -> Vec<Vec<u32>> {
        let mut solutions = Vec::new();
        Search::new(table).run(&mut |chosen| {
            solutions.push(chosen.to_vec());
            solutions.len() < limit
        });
        solutions
    }

    #[test]
    fn test_single_piece_catalogue_has_no_cover() {
        // only the 1×1 exists; the other piece columns can never be covered
        let table = PlacementTable::for_catalogue(&CATALOGUE[10..]);
        let mut visited = 0;
        let status = Search::new(&table).run(&mut |_| {
            visited += 1;
            true
        });
        assert_eq!(status, SearchStatus::Exhausted);
        assert_eq!(visited, 0);
    }

    #[test]
    fn test_solutions_satisfy_cover_invariants() {
        let table = PlacementTable::new().unwrap();
        for solution in first_solutions(&table, 3) {
            assert_eq!(solution.len(), NUM_PIECES);

            let mut pieces_seen = 0u16;
            let mut covered = 0u128;
            for &row in &solution {
                let placement = table.placement(row);
                assert_eq!(pieces_seen >> placement.piece & 1, 0);
                pieces_seen |= 1u16 << placement.piece;
                assert_eq!(covered & placement.mask, 0);
                covered |= placement.mask;
            }
            assert_eq!(covered, FULL_COVER);
            assert_eq!(covered as u64, u64::MAX);

            let key = black_layout_key(&table, &solution).unwrap();
            assert!(key.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_enumeration_is_deterministic() {
        let table = PlacementTable::new().unwrap();
        let first = first_solutions(&table, 5);
        let second = first_solutions(&table, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_visitor_stop_unwinds_cleanly() {
        let table = PlacementTable::new().unwrap();
        let mut visited = 0;
        let status = Search::new(&table).run(&mut |_| {
            visited += 1;
            false
        });
        assert_eq!(status, SearchStatus::Stopped);
        assert_eq!(visited, 1);
    }

    #[test]
    fn test_cancellation_before_start() {
        let table = PlacementTable::new().unwrap();
        let token = CancelToken::new();
        token.cancel();

        let mut visited = 0;
        let status = Search::new(&table).with_cancel(token).run(&mut |_| {
            visited += 1;
            true
        });
        assert_eq!(status, SearchStatus::Cancelled);
        assert_eq!(visited, 0);
    }

    #[test]
    fn test_assume_rejects_conflicts() {
        let table = PlacementTable::new().unwrap();
        let mut search = Search::new(&table);
        assert!(search.assume(0));
        // re-placing the same piece consumes the same piece column
        assert!(!search.assume(0));
    }

    #[test]
    fn test_layout_restricted_count_finds_witness() {
        let table = PlacementTable::new().unwrap();
        let solution = &first_solutions(&table, 1)[0];
        let key = black_layout_key(&table, solution).unwrap();
        assert_eq!(count_layout_tilings(&table, &key, 1), 1);
    }
}
