//! The undo/redo history: an arena of moves addressed by index, with an
//! explicit cursor standing in for the sentinel-and-pointer ring described
//! in the original design. `cursor == None` means "before the first move",
//! matching the sentinel; `cursor == Some(i)` means moves `0..=i` are
//! applied and moves `i+1..` (if any) are undone and redoable.
//!
//! Appending at the cursor truncates everything after it, same as the
//! pointer version: `Vec::truncate` frees the tail in one step.

use crate::board::Board;

/// One cell's before/after transition within a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub row: usize,
    pub col: usize,
    pub before: usize,
    pub after: usize,
}

/// A user-perceived atomic operation: an ordered, non-empty list of
/// per-cell changes that never touches the same cell twice.
#[derive(Debug, Clone)]
pub struct Move {
    pub changes: Vec<Change>,
}

impl Move {
    pub fn single(row: usize, col: usize, before: usize, after: usize) -> Self {
        Move {
            changes: vec![Change {
                row,
                col,
                before,
                after,
            }],
        }
    }
}

#[derive(Debug, Default)]
pub struct History {
    moves: Vec<Move>,
    cursor: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        History {
            moves: Vec::new(),
            cursor: None,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        match self.cursor {
            None => !self.moves.is_empty(),
            Some(i) => i + 1 < self.moves.len(),
        }
    }

    /// Truncate everything after the cursor, splice `mv` in, and advance
    /// the cursor onto it.
    pub fn append(&mut self, mv: Move) {
        debug_assert!(!mv.changes.is_empty());
        let keep = match self.cursor {
            None => 0,
            Some(i) => i + 1,
        };
        self.moves.truncate(keep);
        self.moves.push(mv);
        self.cursor = Some(self.moves.len() - 1);
    }

    /// Apply the cursor's move in reverse onto `board`, then step the
    /// cursor back. Panics if `can_undo()` is false; callers (the game
    /// engine) gate on that first.
    pub fn undo(&mut self, board: &mut Board) -> &Move {
        let i = self.cursor.expect("undo() called with nothing to undo");
        for change in self.moves[i].changes.iter().rev() {
            board.set(change.row, change.col, change.before);
        }
        self.cursor = if i == 0 { None } else { Some(i - 1) };
        &self.moves[i]
    }

    /// Step the cursor forward, then apply that move onto `board`. Panics
    /// if `can_redo()` is false.
    pub fn redo(&mut self, board: &mut Board) -> &Move {
        let i = match self.cursor {
            None => 0,
            Some(i) => i + 1,
        };
        assert!(i < self.moves.len(), "redo() called with nothing to redo");
        for change in &self.moves[i].changes {
            board.set(change.row, change.col, change.after);
        }
        self.cursor = Some(i);
        &self.moves[i]
    }

    /// Undo repeatedly until the cursor reaches the sentinel.
    pub fn reset(&mut self, board: &mut Board) {
        while self.can_undo() {
            self.undo(board);
        }
    }

    /// Drop every move and park the cursor on the sentinel.
    pub fn free_all(&mut self) {
        self.moves.clear();
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_redo_round_trips_through_board() {
        let mut board = Board::empty(3, 3);
        let mut history = History::new();

        board.set(0, 0, 5);
        history.append(Move::single(0, 0, 0, 5));
        assert!(history.can_undo());
        assert!(!history.can_redo());

        history.undo(&mut board);
        assert_eq!(board.get(0, 0), 0);
        assert!(!history.can_undo());
        assert!(history.can_redo());

        history.redo(&mut board);
        assert_eq!(board.get(0, 0), 5);
    }

    #[test]
    fn append_truncates_redo_tail() {
        let mut board = Board::empty(3, 3);
        let mut history = History::new();

        board.set(0, 0, 1);
        history.append(Move::single(0, 0, 0, 1));
        history.undo(&mut board);

        // A fresh move at the cursor should drop the undone one for good.
        board.set(1, 1, 2);
        history.append(Move::single(1, 1, 0, 2));
        assert!(!history.can_redo());

        history.undo(&mut board);
        assert_eq!(board.get(1, 1), 0);
        assert!(!history.can_undo());
    }

    #[test]
    fn reset_is_repeated_undo() {
        let mut board = Board::empty(3, 3);
        let mut history = History::new();
        for i in 0..3 {
            board.set(0, i, i + 1);
            history.append(Move::single(0, i, 0, i + 1));
        }
        history.reset(&mut board);
        assert!(!history.can_undo());
        assert_eq!(board.empty_cells_num(), 81);
    }

    #[test]
    fn multi_change_move_reverts_atomically() {
        let mut board = Board::empty(3, 3);
        let mut history = History::new();
        board.set(0, 0, 1);
        board.set(0, 1, 2);
        history.append(Move {
            changes: vec![
                Change {
                    row: 0,
                    col: 0,
                    before: 0,
                    after: 1,
                },
                Change {
                    row: 0,
                    col: 1,
                    before: 0,
                    after: 2,
                },
            ],
        });
        history.undo(&mut board);
        assert_eq!(board.get(0, 0), 0);
        assert_eq!(board.get(0, 1), 0);
    }
}
