//! Pre-computed placement rows for the exact cover.
//!
//! One row per legal (piece, orientation, translation): a 75-bit composite
//! mask over the 64 cell columns and 11 piece columns, plus the covered
//! cell indices for black-region extraction and reporting. Rows are built
//! once and shared read-only; an inverted index maps every column to the
//! rows that cover it.

use crate::board::{cell_index, BOARD_SIZE, NUM_CELLS};
use crate::error::PuzzleError;
use crate::geometry::all_orientations;
use crate::pieces::{validate_catalogue, Coord, Piece, CATALOGUE, MAX_PIECE_CELLS, NUM_PIECES};

/// Total number of exact-cover columns: 64 cells + 11 pieces.
pub const NUM_COLUMNS: usize = NUM_CELLS + NUM_PIECES;

/// Composite mask with every column covered.
pub const FULL_COVER: u128 = (1 << NUM_COLUMNS) - 1;

/// A concrete positioning of one piece on the board.
///
/// Immutable once built. The fixed-size cell array avoids per-row heap
/// allocation in the search.
#[derive(Clone, Copy)]
pub struct Placement {
    /// Catalogue index of the piece this row consumes.
    pub piece: u8,
    /// 75-bit composite mask: covered cells plus the piece consumption bit.
    pub mask: u128,
    cell_indices: [u8; MAX_PIECE_CELLS],
    cell_count: u8,
}

impl Placement {
    /// Board cells covered by this placement, ascending.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cell_indices[..self.cell_count as usize]
    }

    /// The 64-bit cell portion of the composite mask.
    #[inline]
    pub fn cell_mask(&self) -> u64 {
        self.mask as u64
    }
}

/// All legal placements plus the column-to-rows inverted index.
pub struct PlacementTable {
    pieces: Vec<Piece>,
    placements: Vec<Placement>,
    columns: Vec<Vec<u32>>,
}

impl PlacementTable {
    /// Builds the table for the standard catalogue.
    ///
    /// Fails with [`PuzzleError::CatalogueMismatch`] if the piece areas do
    /// not sum to the board area.
    pub fn new() -> Result<PlacementTable, PuzzleError> {
        validate_catalogue(&CATALOGUE)?;
        Ok(PlacementTable::for_catalogue(&CATALOGUE))
    }

    /// Builds a table for an arbitrary piece list, without area validation.
    pub(crate) fn for_catalogue(pieces: &[Piece]) -> PlacementTable {
        let mut placements = Vec::new();
        for (piece_id, piece) in pieces.iter().enumerate() {
            for orientation in all_orientations(&piece.prototype()) {
                emit_translations(piece_id, &orientation, &mut placements);
            }
        }

        let mut columns = vec![Vec::new(); NUM_COLUMNS];
        for (row, placement) in placements.iter().enumerate() {
            let mut bits = placement.mask;
            while bits != 0 {
                let column = bits.trailing_zeros() as usize;
                columns[column].push(row as u32);
                bits &= bits - 1;
            }
        }

        PlacementTable {
            pieces: pieces.to_vec(),
            placements,
            columns,
        }
    }

    #[inline]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    #[inline]
    pub fn placement(&self, row: u32) -> &Placement {
        &self.placements[row as usize]
    }

    /// The catalogue this table was built from.
    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// The piece a row consumes.
    #[inline]
    pub fn piece_of(&self, row: u32) -> &Piece {
        &self.pieces[self.placement(row).piece as usize]
    }

    /// Rows covering `column`, ascending by row id.
    #[inline]
    pub fn candidates(&self, column: usize) -> &[u32] {
        &self.columns[column]
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Emits one placement per in-bounds top-left translation of an orientation.
fn emit_translations(piece_id: usize, orientation: &[Coord], out: &mut Vec<Placement>) {
    let width = 1 + orientation.iter().map(|&(x, _)| x).max().unwrap();
    let height = 1 + orientation.iter().map(|&(_, y)| y).max().unwrap();
    let piece_bit = 1u128 << (NUM_CELLS + piece_id);

    for dx in 0..=(BOARD_SIZE as i32 - width) {
        for dy in 0..=(BOARD_SIZE as i32 - height) {
            let mut mask = piece_bit;
            let mut cell_indices = [0u8; MAX_PIECE_CELLS];
            for (slot, &(x, y)) in orientation.iter().enumerate() {
                let cell = cell_index((y + dy) as u8, (x + dx) as u8);
                mask |= 1u128 << cell;
                cell_indices[slot] = cell;
            }
            cell_indices[..orientation.len()].sort_unstable();

            out.push(Placement {
                piece: piece_id as u8,
                mask,
                cell_indices,
                cell_count: orientation.len() as u8,
            });
        }
    }
}
