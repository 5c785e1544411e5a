//! The unique-layout index file.
//!
//! Wire format: a zlib-compressed JSON object mapping semicolon-joined
//! cell indices (`"c1;c2;c3;c4;c5;c6"`, ascending) to the integer 1. Only
//! layouts realised by exactly one tiling are stored. The format is opaque
//! outside the tool but stable: a loader in any language can recover the
//! key set with a zlib inflate and a JSON parse.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::aggregator::LayoutKey;
use crate::board::NUM_CELLS;
use crate::error::PuzzleError;
use crate::pieces::BLACK_CELLS;

/// Writes `layouts` to `path`.
pub fn save_index(path: &Path, layouts: &[LayoutKey]) -> Result<(), PuzzleError> {
    let mut mapping = BTreeMap::new();
    for key in layouts {
        mapping.insert(key_string(key), 1u8);
    }
    let payload = serde_json::to_vec(&mapping)
        .map_err(|err| PuzzleError::MalformedIndex { reason: err.to_string() })?;

    let file = File::create(path)?;
    let mut encoder = ZlibEncoder::new(file, Compression::default());
    encoder.write_all(&payload)?;
    encoder.finish()?;
    Ok(())
}

/// Formats a key in its on-disk string form.
pub fn key_string(key: &LayoutKey) -> String {
    key.iter()
        .map(|cell| cell.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

/// Loads every layout key from `path`, in lexicographic key-string order.
///
/// Every entry is validated: six cell indices in `0..64`, strictly
/// ascending. Anything else is a [`PuzzleError::MalformedIndex`].
pub fn load_index(path: &Path) -> Result<Vec<LayoutKey>, PuzzleError> {
    let file = File::open(path)?;
    let mut decoder = ZlibDecoder::new(file);
    let mut payload = Vec::new();
    decoder.read_to_end(&mut payload)?;

    let mapping: BTreeMap<String, u64> = serde_json::from_slice(&payload)
        .map_err(|err| PuzzleError::MalformedIndex { reason: err.to_string() })?;

    mapping.keys().map(|entry| parse_key(entry)).collect()
}

/// Parses and validates one `"c1;c2;…;c6"` entry.
fn parse_key(entry: &str) -> Result<LayoutKey, PuzzleError> {
    let malformed = |reason: String| PuzzleError::MalformedIndex { reason };

    let mut key = [0u8; BLACK_CELLS];
    let mut len = 0usize;
    for part in entry.split(';') {
        if len == BLACK_CELLS {
            return Err(malformed(format!(
                "key {entry:?} has more than {BLACK_CELLS} cells"
            )));
        }
        let cell: u8 = part
            .parse()
            .map_err(|_| malformed(format!("key {entry:?}: {part:?} is not a cell index")))?;
        if cell as usize >= NUM_CELLS {
            return Err(malformed(format!(
                "key {entry:?}: cell {cell} is outside the board"
            )));
        }
        if len > 0 && key[len - 1] >= cell {
            return Err(malformed(format!("key {entry:?} is not strictly ascending")));
        }
        key[len] = cell;
        len += 1;
    }

    if len != BLACK_CELLS {
        return Err(malformed(format!(
            "key {entry:?} has {len} cells, expected {BLACK_CELLS}"
        )));
    }
    Ok(key)
}

/// Draws one layout uniformly at random.
pub fn sample<'a, R: Rng + ?Sized>(layouts: &'a [LayoutKey], rng: &mut R) -> Option<&'a LayoutKey> {
    layouts.choose(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mondrian-{}-{}.idx", name, std::process::id()))
    }

    fn write_raw(path: &Path, payload: &[u8]) {
        let file = File::create(path).unwrap();
        let mut encoder = ZlibEncoder::new(file, Compression::default());
        encoder.write_all(payload).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn test_save_load_roundtrip() {
        let layouts = vec![
            [0, 1, 2, 7, 56, 63],
            [10, 11, 12, 20, 21, 30],
            [27, 28, 29, 35, 36, 37],
        ];
        let path = temp_path("roundtrip");

        save_index(&path, &layouts).unwrap();
        let loaded = load_index(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let mut expected = layouts.clone();
        expected.sort_by_key(|key| key_string(key));
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_key_string_format() {
        assert_eq!(key_string(&[0, 1, 2, 7, 56, 63]), "0;1;2;7;56;63");
    }

    #[test]
    fn test_load_rejects_short_key() {
        let path = temp_path("short");
        write_raw(&path, br#"{"1;2;3": 1}"#);
        let err = load_index(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, PuzzleError::MalformedIndex { .. }));
    }

    #[test]
    fn test_load_rejects_unsorted_key() {
        let path = temp_path("unsorted");
        write_raw(&path, br#"{"3;2;1;4;5;6": 1}"#);
        let err = load_index(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, PuzzleError::MalformedIndex { .. }));
    }

    #[test]
    fn test_load_rejects_out_of_range_cell() {
        let path = temp_path("range");
        write_raw(&path, br#"{"1;2;3;4;5;64": 1}"#);
        let err = load_index(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, PuzzleError::MalformedIndex { .. }));
    }

    #[test]
    fn test_load_rejects_garbage_payload() {
        let path = temp_path("garbage");
        write_raw(&path, b"not json at all");
        let err = load_index(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, PuzzleError::MalformedIndex { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_index(Path::new("/nonexistent/mondrian.idx")).unwrap_err();
        assert!(matches!(err, PuzzleError::Io(_)));
    }

    #[test]
    fn test_sample_draws_members() {
        let layouts = vec![[0, 1, 2, 3, 4, 5], [8, 9, 10, 11, 12, 13]];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let drawn = sample(&layouts, &mut rng).unwrap();
            assert!(layouts.contains(drawn));
        }
        assert!(sample(&[], &mut rng).is_none());
    }
}
