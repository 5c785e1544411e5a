//! The layout report: a JSON transcript of distinct black-piece
//! combinations found during a build.
//!
//! Combinations are de-duplicated by the *union* of black cells — the
//! three black pieces are interchangeable — and the piece assignment of
//! the first witnessing solution is what gets recorded.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Local};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::aggregator::LayoutKey;
use crate::board::{cell_col, cell_index, cell_row, BOARD_SIZE};
use crate::error::PuzzleError;
use crate::pieces::{Piece, BLACK_CELLS, BLACK_PIECES, CATALOGUE};
use crate::placements::{Placement, PlacementTable};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize, Deserialize, Debug)]
pub struct LayoutReport {
    pub metadata: Metadata,
    pub piece_definitions: BTreeMap<String, PieceDefinition>,
    pub black_piece_combinations: Vec<Combination>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Metadata {
    pub total_solutions: u64,
    pub unique_black_combinations: u64,
    pub start_time: String,
    pub end_time: String,
    pub elapsed_time_seconds: f64,
    pub board_size: u32,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PieceDefinition {
    pub name: String,
    pub size: Size,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Combination {
    pub combination_id: u64,
    pub solution_id: u64,
    pub timestamp: String,
    pub black_pieces: BTreeMap<String, BlackPiece>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BlackPiece {
    pub name: String,
    pub color: String,
    pub position: Position,
    pub size: Size,
    pub cells: Vec<CellRef>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Position {
    pub top_left: CellRef,
    pub bottom_right: CellRef,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct CellRef {
    pub row: u8,
    pub col: u8,
}

impl Combination {
    /// Rebuilds the canonical six-cell key from the recorded pieces.
    pub fn layout_key(&self) -> Result<LayoutKey, PuzzleError> {
        let mut cells: Vec<u8> = self
            .black_pieces
            .values()
            .flat_map(|piece| piece.cells.iter().map(|cell| cell_index(cell.row, cell.col)))
            .collect();
        cells.sort_unstable();
        cells.dedup();

        if cells.len() != BLACK_CELLS {
            return Err(PuzzleError::InvariantViolation { found: cells.len() });
        }
        let mut key = [0u8; BLACK_CELLS];
        key.copy_from_slice(&cells);
        Ok(key)
    }
}

/// Accumulates distinct black-piece combinations during a sequential build.
pub struct ReportCollector {
    started_at: DateTime<Local>,
    seen: FxHashSet<LayoutKey>,
    combinations: Vec<Combination>,
    total_solutions: u64,
}

impl ReportCollector {
    pub fn new() -> ReportCollector {
        ReportCollector {
            started_at: Local::now(),
            seen: FxHashSet::default(),
            combinations: Vec::new(),
            total_solutions: 0,
        }
    }

    /// Records one solution. A combination is appended only the first time
    /// its black-cell union is seen.
    pub fn record(&mut self, table: &PlacementTable, chosen: &[u32], key: LayoutKey) {
        self.total_solutions += 1;
        if !self.seen.insert(key) {
            return;
        }

        let mut black_pieces = BTreeMap::new();
        for &row in chosen {
            let piece = table.piece_of(row);
            if !piece.is_black() {
                continue;
            }
            black_pieces.insert(
                piece.code.to_string(),
                describe_placement(piece, table.placement(row)),
            );
        }

        self.combinations.push(Combination {
            combination_id: self.combinations.len() as u64 + 1,
            solution_id: self.total_solutions,
            timestamp: Local::now().format(TIME_FORMAT).to_string(),
            black_pieces,
        });
    }

    /// Finalises the report with run metadata.
    pub fn finish(self) -> LayoutReport {
        let ended_at = Local::now();
        LayoutReport {
            metadata: Metadata {
                total_solutions: self.total_solutions,
                unique_black_combinations: self.combinations.len() as u64,
                start_time: self.started_at.format(TIME_FORMAT).to_string(),
                end_time: ended_at.format(TIME_FORMAT).to_string(),
                elapsed_time_seconds: (ended_at - self.started_at).num_milliseconds() as f64
                    / 1000.0,
                board_size: BOARD_SIZE as u32,
            },
            piece_definitions: black_piece_definitions(),
            black_piece_combinations: self.combinations,
        }
    }
}

impl Default for ReportCollector {
    fn default() -> Self {
        ReportCollector::new()
    }
}

fn describe_placement(piece: &Piece, placement: &Placement) -> BlackPiece {
    let cells: Vec<CellRef> = placement
        .cells()
        .iter()
        .map(|&cell| CellRef {
            row: cell_row(cell),
            col: cell_col(cell),
        })
        .collect();

    let min_row = cells.iter().map(|cell| cell.row).min().unwrap();
    let max_row = cells.iter().map(|cell| cell.row).max().unwrap();
    let min_col = cells.iter().map(|cell| cell.col).min().unwrap();
    let max_col = cells.iter().map(|cell| cell.col).max().unwrap();

    BlackPiece {
        name: piece.name.to_string(),
        color: piece.code.to_string(),
        position: Position {
            top_left: CellRef {
                row: min_row,
                col: min_col,
            },
            bottom_right: CellRef {
                row: max_row,
                col: max_col,
            },
        },
        size: Size {
            width: (max_col - min_col + 1) as u32,
            height: (max_row - min_row + 1) as u32,
        },
        cells,
    }
}

/// The K/k/x legend included in every report.
fn black_piece_definitions() -> BTreeMap<String, PieceDefinition> {
    BLACK_PIECES
        .iter()
        .map(|&id| {
            let piece = &CATALOGUE[id];
            (
                piece.code.to_string(),
                PieceDefinition {
                    name: piece.name.to_string(),
                    size: Size {
                        width: piece.width as u32,
                        height: piece.height as u32,
                    },
                },
            )
        })
        .collect()
}

/// Writes a report as pretty-printed JSON.
pub fn save_report(path: &Path, report: &LayoutReport) -> Result<(), PuzzleError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)?;
    Ok(())
}

/// Loads a report produced by `build --report`.
pub fn load_report(path: &Path) -> Result<LayoutReport, PuzzleError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
