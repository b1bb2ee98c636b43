//! Random puzzle generation: plant `x` clues, solve with the ILP back-end,
//! clear back down to `y` clues, retry up to 1000 times on failure.

use std::collections::HashSet;

use itertools::iproduct;
use rand::seq::SliceRandom;

use crate::board::Board;
use crate::error::{Error, Result};
use crate::history::{Change, History, Move};
use crate::model::{IlpOutcome, SolverBackend};
use crate::rng::Rng;

const MAX_RETRIES: usize = 1000;

/// Plant `x` clues and clear back down to `y`, appending the net change as
/// one atomic move. Assumes `x <= board.empty_cells_num()`; out-of-range
/// parameters are the game engine's job to reject before this is called.
pub fn generate(
    board: &mut Board,
    history: &mut History,
    rng: &mut Rng,
    backend: &dyn SolverBackend,
    x: usize,
    y: usize,
) -> Result<()> {
    for _ in 0..MAX_RETRIES {
        let snapshot = board.clone();
        if try_once(board, rng, backend, x, y)? {
            // §4.5 step 5 / the original's generate(): a move is recorded
            // iff y > 0, not merely iff the board changed. At y == 0 any
            // pre-existing clues on an Edit board get wiped by this call,
            // but that wipe is not itself undoable.
            if y > 0 {
                record_move(&snapshot, board, history);
            }
            return Ok(());
        }
        *board = snapshot;
    }
    Err(Error::GenerateFail)
}

/// One attempt: plant, solve, clear. Returns `false` (caller retries) if
/// planting ran dry or the planted board turned out unsolvable.
fn try_once(
    board: &mut Board,
    rng: &mut Rng,
    backend: &dyn SolverBackend,
    x: usize,
    y: usize,
) -> Result<bool> {
    let n = board.n();
    let mut empties: Vec<(usize, usize)> = iproduct!(0..n, 0..n)
        .filter(|&(i, j)| board.get(i, j) == 0)
        .collect();
    if x > empties.len() {
        return Ok(false);
    }
    empties.shuffle(rng.inner_mut());

    for &(row, col) in empties.iter().take(x) {
        let candidates = board.legal_values(row, col);
        let Some(&v) = candidates.choose(rng.inner_mut()) else {
            return Ok(false);
        };
        board.set(row, col, v);
    }

    let solved = match backend.solve_ilp(board)? {
        IlpOutcome::Solvable(solved) => solved,
        IlpOutcome::Unsolvable => return Ok(false),
    };
    *board = solved;

    let mut filled: Vec<(usize, usize)> = iproduct!(0..n, 0..n)
        .filter(|&(i, j)| board.get(i, j) != 0)
        .collect();
    filled.shuffle(rng.inner_mut());
    let keep: HashSet<(usize, usize)> = filled.into_iter().take(y).collect();

    for i in 0..n {
        for j in 0..n {
            if board.get(i, j) != 0 && !keep.contains(&(i, j)) {
                board.set(i, j, 0);
            }
        }
    }

    Ok(true)
}

/// Diff `before` against `after` and append the result as one move. Only
/// called by the caller when `y > 0`; still skips appending if the diff
/// happens to be empty (it shouldn't be, since `y > 0` implies at least one
/// clue survived the clearing step, but an empty move is never valid to
/// append regardless).
fn record_move(before: &Board, after: &Board, history: &mut History) {
    let n = after.n();
    let mut changes = Vec::new();
    for i in 0..n {
        for j in 0..n {
            let b = before.get(i, j);
            let a = after.get(i, j);
            if b != a {
                changes.push(Change {
                    row: i,
                    col: j,
                    before: b,
                    after: a,
                });
            }
        }
    }
    if !changes.is_empty() {
        history.append(Move { changes });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockBackend;

    #[test]
    fn generate_zero_zero_is_a_no_op() {
        let mut board = Board::empty(3, 3);
        let mut history = History::new();
        let mut rng = Rng::from_seed(42);
        generate(&mut board, &mut history, &mut rng, &MockBackend, 0, 0).unwrap();
        assert_eq!(board.empty_cells_num(), 81);
        assert!(!history.can_undo());
    }

    #[test]
    fn generate_one_clue_records_single_change_move() {
        let mut board = Board::empty(2, 2);
        let mut history = History::new();
        let mut rng = Rng::from_seed(7);
        generate(&mut board, &mut history, &mut rng, &MockBackend, 3, 1).unwrap();
        assert_eq!(board.empty_cells_num(), 15);
        assert!(history.can_undo());
    }

    #[test]
    fn generate_y_zero_wipes_existing_clues_without_recording_a_move() {
        // A board that already holds a clue: y == 0 still clears it (the
        // clearing step isn't gated), but per §4.5 step 5 no move is
        // recorded when y == 0, so the wipe itself isn't undoable.
        let mut board = Board::empty(2, 2);
        board.set(0, 0, 1);
        let mut history = History::new();
        let mut rng = Rng::from_seed(11);
        generate(&mut board, &mut history, &mut rng, &MockBackend, 2, 0).unwrap();
        assert_eq!(board.empty_cells_num(), 16);
        assert!(!history.can_undo());
    }
}
