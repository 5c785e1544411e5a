//! Difficulty scoring for black-cell layouts.
//!
//! Six geometric factors grade how hard a layout is to complete by hand:
//! scattered, fragmented, corner-hugging layouts score high, while
//! mirror-symmetric ones earn a bonus towards easy. Scoring is a pure
//! function of the key.

use crate::aggregator::LayoutKey;
use crate::board::{cell_col, cell_row, BOARD_SIZE};

const LAST: i32 = BOARD_SIZE as i32 - 1;

/// Difficulty bucket for a scored layout.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Difficulty {
    Beginner,
    Advanced,
    Master,
    Grandmaster,
}

impl Difficulty {
    fn from_score(total: f64) -> Difficulty {
        if total < 50.0 {
            Difficulty::Beginner
        } else if total < 100.0 {
            Difficulty::Advanced
        } else if total < 150.0 {
            Difficulty::Master
        } else {
            Difficulty::Grandmaster
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Advanced => "advanced",
            Difficulty::Master => "master",
            Difficulty::Grandmaster => "grandmaster",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-factor score breakdown. Every factor except the symmetry bonus is
/// clamped to non-negative before summing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FactorScores {
    pub spread: f64,
    pub fragmentation: f64,
    pub edge_proximity: f64,
    pub connectivity: f64,
    pub symmetry: f64,
    pub corner_occupation: f64,
}

/// A scored layout.
#[derive(Clone, Copy, Debug)]
pub struct DifficultyScore {
    pub total: f64,
    pub difficulty: Difficulty,
    pub factors: FactorScores,
}

/// Scores a black-cell layout.
pub fn score_layout(key: &LayoutKey) -> DifficultyScore {
    let cells: Vec<(i32, i32)> = key
        .iter()
        .map(|&cell| (cell_row(cell) as i32, cell_col(cell) as i32))
        .collect();

    let spread = spread_score(&cells);
    let fragmentation = fragmentation_score(&cells);
    let edge_proximity = edge_proximity_score(&cells);
    let connectivity = connectivity_score(&cells);
    let symmetry = symmetry_score(&cells);
    let corner_occupation = corner_score(&cells);

    let sum = spread + fragmentation + edge_proximity + connectivity + symmetry + corner_occupation;
    let total = round2(sum.max(0.0));

    DifficultyScore {
        total,
        difficulty: Difficulty::from_score(total),
        factors: FactorScores {
            spread: round2(spread),
            fragmentation: round2(fragmentation),
            edge_proximity: round2(edge_proximity),
            connectivity: round2(connectivity),
            symmetry: round2(symmetry),
            corner_occupation: round2(corner_occupation),
        },
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Bounding-box extent, 10 points per spanned row/column, capped at 100.
fn spread_score(cells: &[(i32, i32)]) -> f64 {
    let min_row = cells.iter().map(|&(row, _)| row).min().unwrap();
    let max_row = cells.iter().map(|&(row, _)| row).max().unwrap();
    let min_col = cells.iter().map(|&(_, col)| col).min().unwrap();
    let max_col = cells.iter().map(|&(_, col)| col).max().unwrap();

    let spread = (max_col - min_col) + (max_row - min_row);
    ((spread * 10) as f64).min(100.0)
}

/// 30 points for every 4-connected component beyond the first.
fn fragmentation_score(cells: &[(i32, i32)]) -> f64 {
    ((component_count(cells) - 1) * 30) as f64
}

fn component_count(cells: &[(i32, i32)]) -> usize {
    let mut visited = vec![false; cells.len()];
    let mut components = 0;

    for start in 0..cells.len() {
        if visited[start] {
            continue;
        }
        components += 1;
        visited[start] = true;
        let mut stack = vec![start];

        while let Some(index) = stack.pop() {
            let (row, col) = cells[index];
            for (dr, dc) in [(0, 1), (0, -1), (1, 0), (-1, 0)] {
                let neighbour = (row + dr, col + dc);
                if let Some(next) = cells.iter().position(|&cell| cell == neighbour) {
                    if !visited[next] {
                        visited[next] = true;
                        stack.push(next);
                    }
                }
            }
        }
    }

    components
}

/// Mean distance to the nearest board edge, 20 points per cell under 3.
fn edge_proximity_score(cells: &[(i32, i32)]) -> f64 {
    let total: i32 = cells
        .iter()
        .map(|&(row, col)| row.min(col).min(LAST - row).min(LAST - col))
        .sum();
    let mean = total as f64 / cells.len() as f64;
    ((3.0 - mean) * 20.0).max(0.0)
}

/// Sparse adjacency scores high. The divisor is 2·|C| = 12 even though 10
/// ordered pairs is the true maximum, so a fully connected strip still
/// scores above zero; the shaping is intentional and index-compatible.
fn connectivity_score(cells: &[(i32, i32)]) -> f64 {
    let mut adjacent_pairs = 0usize;
    for &(row, col) in cells {
        for (dr, dc) in [(0, 1), (0, -1), (1, 0), (-1, 0)] {
            if cells.contains(&(row + dr, col + dc)) {
                adjacent_pairs += 1;
            }
        }
    }

    let ratio = adjacent_pairs as f64 / (cells.len() * 2) as f64;
    ((1.0 - ratio) * 40.0).max(0.0)
}

/// −20 if the layout is invariant under either mirror axis.
fn symmetry_score(cells: &[(i32, i32)]) -> f64 {
    let horizontal = cells
        .iter()
        .all(|&(row, col)| cells.contains(&(row, LAST - col)));
    let vertical = cells
        .iter()
        .all(|&(row, col)| cells.contains(&(LAST - row, col)));

    if horizontal || vertical {
        -20.0
    } else {
        0.0
    }
}

/// 15 points per occupied board corner.
fn corner_score(cells: &[(i32, i32)]) -> f64 {
    let corners = [(0, 0), (0, LAST), (LAST, 0), (LAST, LAST)];
    let occupied = corners
        .iter()
        .filter(|&&corner| cells.contains(&corner))
        .count();
    (occupied * 15) as f64
}
