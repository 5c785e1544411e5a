//! 2D rotation and reflection utilities.
//!
//! A piece on the board can appear in any image of its prototype under the
//! dihedral group of the square: four quarter-turns composed with optional
//! horizontal and vertical reflections. Normalisation and deduplication
//! collapse that group to the handful of genuinely distinct orientations.

use crate::pieces::Coord;

/// Rotates a cell set 90° counter-clockwise in the piece frame.
fn rotate90(cells: &[Coord]) -> Vec<Coord> {
    cells.iter().map(|&(x, y)| (y, -x)).collect()
}

/// Mirrors a cell set across the vertical axis.
fn flip_x(cells: &[Coord]) -> Vec<Coord> {
    cells.iter().map(|&(x, y)| (-x, y)).collect()
}

/// Mirrors a cell set across the horizontal axis.
fn flip_y(cells: &[Coord]) -> Vec<Coord> {
    cells.iter().map(|&(x, y)| (x, -y)).collect()
}

/// Translates a cell set so the minimum x and y are zero, then sorts it.
///
/// Two orientations that differ only by translation normalise to the same
/// cell set, so normalised sets compare directly.
pub fn normalize(mut cells: Vec<Coord>) -> Vec<Coord> {
    let min_x = cells.iter().map(|&(x, _)| x).min().unwrap();
    let min_y = cells.iter().map(|&(_, y)| y).min().unwrap();

    for (x, y) in &mut cells {
        *x -= min_x;
        *y -= min_y;
    }

    cells.sort_unstable();
    cells
}

/// Generates all distinct orientations of a piece.
///
/// Applies the four quarter-turns, each combined with optional horizontal
/// and vertical reflections, normalises every candidate and removes
/// duplicates. Rectangles with unequal sides yield two orientations;
/// squares (and the 1×1) yield one.
pub fn all_orientations(cells: &[Coord]) -> Vec<Vec<Coord>> {
    let mut orientations = Vec::new();
    let mut shape = cells.to_vec();

    for _ in 0..4 {
        shape = rotate90(&shape);
        for fx in [false, true] {
            for fy in [false, true] {
                let mut candidate = shape.clone();
                if fx {
                    candidate = flip_x(&candidate);
                }
                if fy {
                    candidate = flip_y(&candidate);
                }
                orientations.push(normalize(candidate));
            }
        }
    }

    orientations.sort();
    orientations.dedup();
    orientations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::CATALOGUE;

    fn orientations_of(name: &str) -> Vec<Vec<Coord>> {
        let piece = CATALOGUE.iter().find(|p| p.name == name).unwrap();
        all_orientations(&piece.prototype())
    }

    #[test]
    fn test_orientation_counts() {
        assert_eq!(orientations_of("R_3x4").len(), 2);
        assert_eq!(orientations_of("B_3x3").len(), 1);
        assert_eq!(orientations_of("B_2x2").len(), 1);
        assert_eq!(orientations_of("W_1x5").len(), 2);
        assert_eq!(orientations_of("Y_2x3").len(), 2);
        assert_eq!(orientations_of("K_1x1").len(), 1);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for piece in &CATALOGUE {
            for orientation in all_orientations(&piece.prototype()) {
                assert_eq!(normalize(orientation.clone()), orientation);
            }
        }
    }

    #[test]
    fn test_orientations_closed_under_symmetry() {
        for piece in &CATALOGUE {
            let orientations = all_orientations(&piece.prototype());
            for orientation in &orientations {
                let rotated = normalize(rotate90(orientation));
                let mirrored = normalize(flip_x(orientation));
                assert!(orientations.contains(&rotated));
                assert!(orientations.contains(&mirrored));
            }
        }
    }

    #[test]
    fn test_orientations_preserve_cell_count() {
        for piece in &CATALOGUE {
            for orientation in all_orientations(&piece.prototype()) {
                assert_eq!(orientation.len(), piece.area());
            }
        }
    }
}
