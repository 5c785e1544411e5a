//! The Mondrian Blocks piece catalogue.
//!
//! Eleven axis-aligned rectangles: eight coloured blocks plus the three
//! black starter blocks. The catalogue is fixed, covers the board exactly,
//! and every tiling uses each piece exactly once.

use crate::board::NUM_CELLS;
use crate::error::PuzzleError;

/// A 2D coordinate (x, y) in a piece's local frame.
pub type Coord = (i32, i32);

/// Maximum number of cells in any single piece (the red 3×4).
pub const MAX_PIECE_CELLS: usize = 12;

/// Number of pieces in the catalogue.
pub const NUM_PIECES: usize = 11;

/// Total number of black cells in any solution (1×3 + 1×2 + 1×1).
pub const BLACK_CELLS: usize = 6;

/// Colour class of a piece.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PieceClass {
    Coloured,
    Black,
}

/// One catalogue entry: a width×height rectangle with a stable name and a
/// single-letter colour code (the code keys the report format).
#[derive(Clone, Copy, Debug)]
pub struct Piece {
    pub name: &'static str,
    pub code: char,
    pub width: u8,
    pub height: u8,
    pub class: PieceClass,
}

impl Piece {
    /// Number of cells the piece covers.
    pub const fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub const fn is_black(&self) -> bool {
        matches!(self.class, PieceClass::Black)
    }

    /// Prototype cell set in local coordinates, top-left at the origin.
    pub fn prototype(&self) -> Vec<Coord> {
        let mut cells = Vec::with_capacity(self.area());
        for x in 0..self.width as i32 {
            for y in 0..self.height as i32 {
                cells.push((x, y));
            }
        }
        cells
    }
}

/// The eleven pieces in column order: piece `i` consumes exact-cover
/// column `64 + i`.
pub const CATALOGUE: [Piece; NUM_PIECES] = [
    Piece { name: "R_3x4", code: 'R', width: 3, height: 4, class: PieceClass::Coloured },
    Piece { name: "B_3x3", code: 'B', width: 3, height: 3, class: PieceClass::Coloured },
    Piece { name: "B_2x2", code: 'b', width: 2, height: 2, class: PieceClass::Coloured },
    Piece { name: "W_1x5", code: 'W', width: 1, height: 5, class: PieceClass::Coloured },
    Piece { name: "W_1x4", code: 'w', width: 1, height: 4, class: PieceClass::Coloured },
    Piece { name: "Y_2x5", code: 'Y', width: 2, height: 5, class: PieceClass::Coloured },
    Piece { name: "Y_2x4", code: 'y', width: 2, height: 4, class: PieceClass::Coloured },
    Piece { name: "Y_2x3", code: 'h', width: 2, height: 3, class: PieceClass::Coloured },
    Piece { name: "K_1x3", code: 'K', width: 1, height: 3, class: PieceClass::Black },
    Piece { name: "K_1x2", code: 'k', width: 1, height: 2, class: PieceClass::Black },
    Piece { name: "K_1x1", code: 'x', width: 1, height: 1, class: PieceClass::Black },
];

/// Catalogue indices of the three black starter pieces.
pub const BLACK_PIECES: [usize; 3] = [8, 9, 10];

/// Checks that the piece areas sum to the board area.
pub fn validate_catalogue(pieces: &[Piece]) -> Result<(), PuzzleError> {
    let total: usize = pieces.iter().map(Piece::area).sum();
    if total != NUM_CELLS {
        return Err(PuzzleError::CatalogueMismatch { total });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_covers_board() {
        assert!(validate_catalogue(&CATALOGUE).is_ok());
        let total: usize = CATALOGUE.iter().map(Piece::area).sum();
        assert_eq!(total, 64);
    }

    #[test]
    fn test_partial_catalogue_rejected() {
        let err = validate_catalogue(&CATALOGUE[..3]).unwrap_err();
        assert!(matches!(err, PuzzleError::CatalogueMismatch { total: 25 }));
    }

    #[test]
    fn test_black_pieces_cover_six_cells() {
        let total: usize = BLACK_PIECES.iter().map(|&i| CATALOGUE[i].area()).sum();
        assert_eq!(total, BLACK_CELLS);
        for &i in &BLACK_PIECES {
            assert!(CATALOGUE[i].is_black());
        }
    }

    #[test]
    fn test_colour_codes_are_unique() {
        for (i, a) in CATALOGUE.iter().enumerate() {
            for b in &CATALOGUE[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
    }

    #[test]
    fn test_prototype_size_matches_area() {
        for piece in &CATALOGUE {
            assert_eq!(piece.prototype().len(), piece.area());
        }
    }
}
