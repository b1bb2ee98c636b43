//! The on-disk puzzle format (§6): a header line of `block_rows block_cols`
//! followed by N² whitespace-separated tokens, each an integer optionally
//! suffixed by `.` to mark a clue.

use std::fs;
use std::path::Path;

use sudoku_core::{Board, Error, Result};

/// Read a puzzle file. `keep_clue_marks` controls whether a `.`-suffixed
/// token is recorded as fixed (`solve`) or ignored (`edit`).
pub fn read_puzzle(path: &Path, keep_clue_marks: bool) -> Result<Board> {
    let text =
        fs::read_to_string(path).map_err(|e| Error::Io(format!("{}: {}", path.display(), e)))?;
    let mut tokens = text.split_whitespace();

    let block_rows: usize = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| Error::InvalidPuzzle("missing or malformed header".into()))?;
    let block_cols: usize = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| Error::InvalidPuzzle("missing or malformed header".into()))?;
    if block_rows < 1 || block_cols < 1 {
        return Err(Error::InvalidPuzzle(
            "block dimensions must be at least 1".into(),
        ));
    }
    let n = block_rows * block_cols;

    let mut values = Vec::with_capacity(n * n);
    let mut fixed = Vec::with_capacity(n * n);
    for _ in 0..n * n {
        let tok = tokens
            .next()
            .ok_or_else(|| Error::InvalidPuzzle("not enough cells".into()))?;
        let (digits, is_clue) = match tok.strip_suffix('.') {
            Some(d) => (d, true),
            None => (tok, false),
        };
        let v: usize = digits
            .parse()
            .map_err(|_| Error::InvalidPuzzle(format!("'{}' is not a valid cell token", tok)))?;
        if v > n {
            return Err(Error::InvalidPuzzle(format!(
                "cell value {} out of range 0-{}",
                v, n
            )));
        }
        values.push(v);
        fixed.push(is_clue && keep_clue_marks && v != 0);
    }

    Ok(Board::from_cells(block_rows, block_cols, values, fixed))
}

/// Write `board` to `path`, `"%2d"`-formatted with a trailing `.` for clues
/// (or a space for non-clues) and a trailing space, matching the reference
/// writer byte for byte.
pub fn write_puzzle(path: &Path, board: &Board) -> Result<()> {
    let n = board.n();
    let mut out = String::new();
    out.push_str(&format!("{:2} {:2}\n", board.block_rows(), board.block_cols()));
    for i in 0..n {
        for j in 0..n {
            let v = board.get(i, j);
            out.push_str(&format!("{:2}", v));
            out.push(if board.is_fixed(i, j) { '.' } else { ' ' });
            out.push(' ');
        }
        out.push('\n');
    }
    fs::write(path, out).map_err(|e| Error::Io(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sudoku-cli-test-{}-{}", std::process::id(), name))
    }

    #[test]
    fn reads_header_and_clue_marks() {
        let path = scratch_path("clues");
        fs::write(&path, "2 2\n1. 0 0 0\n0 2. 0 0\n0 0 3 0\n0 0 0 4\n").unwrap();
        let board = read_puzzle(&path, true).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(board.block_rows(), 2);
        assert_eq!(board.block_cols(), 2);
        assert_eq!(board.get(0, 0), 1);
        assert!(board.is_fixed(0, 0));
        assert!(!board.is_fixed(2, 2));
    }

    #[test]
    fn edit_mode_read_ignores_clue_marks() {
        let path = scratch_path("no-clues");
        fs::write(&path, "2 2\n1. 0 0 0\n0 0 0 0\n0 0 0 0\n0 0 0 0\n").unwrap();
        let board = read_puzzle(&path, false).unwrap();
        let _ = fs::remove_file(&path);
        assert!(!board.is_fixed(0, 0));
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut board = Board::empty(2, 2);
        board.set(0, 0, 1);
        board.set_fixed(0, 0, true);
        let path = scratch_path("roundtrip");
        write_puzzle(&path, &board).unwrap();
        let read_back = read_puzzle(&path, true).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(read_back.get(0, 0), 1);
        assert!(read_back.is_fixed(0, 0));
    }
}
