//! Score-weighted random assignment from an LP relaxation: the one place
//! randomness and the solver layer meet. §9's source ambiguity (a sort that
//! recovered the value index from an encoded score offset) is resolved here
//! by simply keeping `(k, score)` pairs through the sort.

use rand::Rng as _;

use crate::board::Board;
use crate::error::Result;
use crate::history::{Change, History, Move};
use crate::model::{LpOutcome, SolverBackend};
use crate::rng::Rng;

fn var_index(n: usize, i: usize, j: usize, k: usize) -> usize {
    i * n * n + j * n + k
}

/// Run the LP, then fill every empty cell whose candidate set (scores at or
/// above `threshold`, still legal given cells already decided earlier in
/// this same pass) is non-empty. A single candidate is taken outright;
/// multiple candidates are resolved by weighted sampling, ties breaking to
/// the smallest `k`. All newly filled cells are recorded as one atomic
/// move. Precondition: the board has no erroneous cells (the game engine's
/// job to check before calling this).
pub fn guess(
    board: &mut Board,
    history: &mut History,
    rng: &mut Rng,
    backend: &dyn SolverBackend,
    threshold: f64,
) -> Result<()> {
    let scores = match backend.solve_lp(board)? {
        LpOutcome::Solvable(scores) => scores,
        // No completion exists to score candidates against; nothing to guess.
        LpOutcome::Unsolvable => return Ok(()),
    };

    let n = board.n();
    let mut scratch = board.clone();
    let mut changes = Vec::new();

    for i in 0..n {
        for j in 0..n {
            if scratch.get(i, j) != 0 {
                continue;
            }
            let mut candidates: Vec<(usize, f64)> = (0..n)
                .filter_map(|k| {
                    let score = scores[var_index(n, i, j, k)];
                    if score >= threshold && scratch.is_legal(i, j, k + 1) {
                        Some((k, score))
                    } else {
                        None
                    }
                })
                .collect();
            if candidates.is_empty() {
                continue;
            }
            let chosen_k = if candidates.len() == 1 {
                candidates[0].0
            } else {
                candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then(a.0.cmp(&b.0)));
                let total: f64 = candidates.iter().map(|&(_, s)| s).sum();
                let mut u = rng.inner_mut().gen_range(0.0..=total);
                let mut chosen = candidates[0].0;
                for &(k, score) in &candidates {
                    chosen = k;
                    u -= score;
                    if u <= 0.0 {
                        break;
                    }
                }
                chosen
            };
            scratch.set(i, j, chosen_k + 1);
            changes.push(Change {
                row: i,
                col: j,
                before: 0,
                after: chosen_k + 1,
            });
        }
    }

    if !changes.is_empty() {
        *board = scratch;
        history.append(Move { changes });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockBackend;

    #[test]
    fn guess_at_threshold_one_fills_the_unique_completion() {
        // A 1x1 board's only completion is trivially (0,0) = 1.
        let mut board = Board::empty(1, 1);
        let mut history = History::new();
        let mut rng = Rng::from_seed(1);
        guess(&mut board, &mut history, &mut rng, &MockBackend, 1.0).unwrap();
        assert_eq!(board.get(0, 0), 1);
        assert!(history.can_undo());
    }

    #[test]
    fn guess_undo_reverts_all_cells_atomically() {
        let mut board = Board::empty(2, 2);
        let mut history = History::new();
        let mut rng = Rng::from_seed(2);
        guess(&mut board, &mut history, &mut rng, &MockBackend, 1.0).unwrap();
        assert_eq!(board.empty_cells_num(), 0);
        history.undo(&mut board);
        assert_eq!(board.empty_cells_num(), 4);
    }

    #[test]
    fn guess_leaves_filled_cells_untouched() {
        let mut board = Board::empty(2, 2);
        board.set(0, 0, 1);
        let mut history = History::new();
        let mut rng = Rng::from_seed(3);
        guess(&mut board, &mut history, &mut rng, &MockBackend, 1.0).unwrap();
        assert_eq!(board.get(0, 0), 1);
    }
}
