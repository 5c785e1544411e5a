//! Error types surfaced by the engine and its stores.
//!
//! The engine itself never logs; everything reportable travels through
//! [`PuzzleError`] and is handled (or printed) at the CLI boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PuzzleError {
    /// The piece catalogue does not cover the board exactly. Fatal at startup.
    #[error("piece catalogue covers {total} cells, the board has 64")]
    CatalogueMismatch { total: usize },

    /// A solution yielded a black region of the wrong size. Indicates a
    /// corrupted placement table; never silently skipped.
    #[error("solution produced {found} black cells, expected 6")]
    InvariantViolation { found: usize },

    /// Cooperative cancellation fired before enumeration finished and the
    /// caller refused the partial result.
    #[error("build cancelled before completion")]
    Cancelled,

    /// Reading or writing a file failed.
    #[error("i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The index file decompressed but does not describe a valid layout set.
    #[error("malformed index: {reason}")]
    MalformedIndex { reason: String },

    /// A layout report could not be serialised or parsed.
    #[error("malformed report: {0}")]
    MalformedReport(#[from] serde_json::Error),
}
