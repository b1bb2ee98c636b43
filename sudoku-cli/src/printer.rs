//! Board rendering: block separators, a `.` clue marker, and (when
//! `mark_errors` is set) a `*` error marker, mirroring §6's reference
//! layout byte for byte.

use std::fmt::Write as _;

use sudoku_core::Board;

/// Render `board` as a grid of block-separated rows.
pub fn render(board: &Board, mark_errors: bool) -> String {
    let n = board.n();
    let block_rows = board.block_rows();
    let block_cols = board.block_cols();
    let mut out = String::new();

    let separator = |out: &mut String| {
        for _ in 0..(4 * n + block_rows + 1) {
            out.push('-');
        }
        out.push('\n');
    };

    separator(&mut out);
    for row in 0..n {
        for block in 0..block_rows {
            out.push('|');
            for col in 0..block_cols {
                write_cell(&mut out, board, row, block * block_cols + col, mark_errors);
            }
        }
        out.push('|');
        out.push('\n');
        if (row + 1) % block_rows == 0 {
            separator(&mut out);
        }
    }
    out
}

fn write_cell(out: &mut String, board: &Board, row: usize, col: usize, mark_errors: bool) {
    let v = board.get(row, col);
    out.push(' ');
    if v != 0 {
        let _ = write!(out, "{:2}", v);
    } else {
        out.push_str("  ");
    }
    if board.is_fixed(row, col) && v != 0 {
        out.push('.');
    } else if board.is_erroneous(row, col) && !board.is_fixed(row, col) && mark_errors && v != 0 {
        out.push('*');
    } else {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_separators_around_every_block_row() {
        let board = Board::empty(2, 2);
        let text = render(&board, true);
        // A separator before the grid, and one after every block_rows rows.
        assert_eq!(text.matches('-').count() > 0, true);
        assert_eq!(text.lines().filter(|l| l.starts_with('-')).count(), 3);
    }

    #[test]
    fn marks_clues_and_errors() {
        let mut board = Board::empty(2, 2);
        board.set(0, 0, 1);
        board.set_fixed(0, 0, true);
        board.set(0, 1, 2);
        board.refresh_errors();
        let text = render(&board, true);
        assert!(text.contains(" 1."));
    }
}
