//! Board geometry for the 8×8 cell universe.
//!
//! The board carries no state of its own; it exists as the index space
//! `0..64` with `index = row·8 + col` and as the low 64 bits of every
//! placement mask.

/// Board side length.
pub const BOARD_SIZE: usize = 8;

/// Total number of board cells.
pub const NUM_CELLS: usize = 64;

/// Converts (row, col) to a linear cell index.
#[inline(always)]
pub const fn cell_index(row: u8, col: u8) -> u8 {
    row * BOARD_SIZE as u8 + col
}

/// Row of a linear cell index.
#[inline(always)]
pub const fn cell_row(cell: u8) -> u8 {
    cell / BOARD_SIZE as u8
}

/// Column of a linear cell index.
#[inline(always)]
pub const fn cell_col(cell: u8) -> u8 {
    cell % BOARD_SIZE as u8
}

/// Renders a black-cell layout as an ASCII board with row and column
/// headers. Occupied cells show as '■', empty cells as '·'.
pub fn render_layout(cells: &[u8]) -> String {
    let mut grid = [[false; BOARD_SIZE]; BOARD_SIZE];
    for &cell in cells {
        grid[cell_row(cell) as usize][cell_col(cell) as usize] = true;
    }

    let header: Vec<String> = (0..BOARD_SIZE).map(|col| col.to_string()).collect();
    let mut output = format!("   {}\n", header.join(" "));

    for (row, line) in grid.iter().enumerate() {
        let marks: Vec<&str> = line
            .iter()
            .map(|&occupied| if occupied { "■" } else { "·" })
            .collect();
        output.push_str(&format!("{}  {}\n", row, marks.join(" ")));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_index_roundtrip() {
        for cell in 0..NUM_CELLS as u8 {
            assert_eq!(cell_index(cell_row(cell), cell_col(cell)), cell);
        }
    }

    #[test]
    fn test_cell_index_layout() {
        assert_eq!(cell_index(0, 0), 0);
        assert_eq!(cell_index(0, 7), 7);
        assert_eq!(cell_index(7, 0), 56);
        assert_eq!(cell_index(7, 7), 63);
    }

    #[test]
    fn test_render_marks_occupied_cells() {
        let rendered = render_layout(&[0, 63]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[1].starts_with("0  ■"));
        assert!(lines[8].ends_with("■"));
        assert_eq!(rendered.matches('■').count(), 2);
    }
}
