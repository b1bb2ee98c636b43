//! The game engine (§4.7): the state machine that owns the board and its
//! history, gates commands by mode, validates parameters, and detects
//! completion. Every handler below performs, in order, the mode check, the
//! parameter check, the state check, the action, the move-recording step and
//! the completion check — exactly the pipeline §4.7 describes.

use std::path::Path;

use log::{debug, error, trace};
use sudoku_core::{Board, Error, History, IlpOutcome, LpOutcome, Result, Rng, SolverBackend};

use crate::command::Command;
use crate::{io, printer};

/// Which puzzle, if any, is currently loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Init,
    Solve,
    Edit,
}

/// A command's mode requirement, per §4.7's table.
enum ModeReq {
    Any,
    SolveOrEdit,
    SolveOnly,
    EditOnly,
}

impl ModeReq {
    fn allows(&self, mode: Mode) -> bool {
        match self {
            ModeReq::Any => true,
            ModeReq::SolveOrEdit => matches!(mode, Mode::Solve | Mode::Edit),
            ModeReq::SolveOnly => mode == Mode::Solve,
            ModeReq::EditOnly => mode == Mode::Edit,
        }
    }

    fn unavailable_message(&self) -> &'static str {
        match self {
            ModeReq::Any | ModeReq::SolveOrEdit => "available in Solve and Edit modes",
            ModeReq::SolveOnly => "available in Solve mode only",
            ModeReq::EditOnly => "available in Edit mode only",
        }
    }
}

/// Borrow the board and history fields directly (not through a `&mut self`
/// method) so the caller's other fields — RNG, solver back-end — stay
/// available for simultaneous use.
fn require<'a>(
    board: &'a mut Option<Board>,
    history: &'a mut Option<History>,
) -> Result<(&'a mut Board, &'a mut History)> {
    match (board.as_mut(), history.as_mut()) {
        (Some(b), Some(h)) => Ok((b, h)),
        _ => unreachable!("mode gate guarantees a loaded puzzle"),
    }
}

/// Owns the board, its history, the RNG stream and the solver back-end for
/// the lifetime of the process. The REPL holds one of these by mutable
/// reference and passes it to `dispatch` for every line it reads.
pub struct GameState {
    mode: Mode,
    mark_errors: bool,
    board: Option<Board>,
    history: Option<History>,
    rng: Rng,
    backend: Box<dyn SolverBackend>,
}

/// What a dispatched command produced: text to print, or a request to stop
/// the REPL loop.
pub enum Outcome {
    Printed(String),
    Exit,
}

impl GameState {
    pub fn new(rng: Rng, backend: Box<dyn SolverBackend>) -> Self {
        GameState {
            mode: Mode::Init,
            mark_errors: true,
            board: None,
            history: None,
            rng,
            backend,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Discard the current puzzle and its history, returning to Init.
    fn free_game(&mut self) {
        self.board = None;
        self.history = None;
        self.mode = Mode::Init;
    }

    /// The mode-gated, parameter-validated entry point. `solve`, `edit` and
    /// `exit` bypass the mode gate entirely, since §4.7 allows them from
    /// every mode including Init.
    pub fn dispatch(&mut self, cmd: Command) -> Result<Outcome> {
        match cmd {
            Command::Solve(path) => return self.cmd_solve(&path).map(Outcome::Printed),
            Command::Edit(path) => return self.cmd_edit(path.as_deref()).map(Outcome::Printed),
            Command::Exit => return Ok(Outcome::Exit),
            _ => {}
        }

        let req = mode_req(&cmd);
        if !req.allows(self.mode) {
            debug!("command rejected: wrong mode ({:?})", self.mode);
            return Err(Error::InvalidMode(req.unavailable_message()));
        }

        let text = match cmd {
            Command::MarkErrors(p) => self.cmd_mark_errors(p)?,
            Command::PrintBoard => self.render(),
            Command::Set(x, y, z) => self.cmd_set(x, y, z)?,
            Command::Validate => self.cmd_validate()?,
            Command::Generate(x, y) => self.cmd_generate(x, y)?,
            Command::Guess(t) => self.cmd_guess(t)?,
            Command::Undo => self.cmd_undo()?,
            Command::Redo => self.cmd_redo()?,
            Command::NumSolutions => self.cmd_num_solutions()?,
            Command::Reset => self.cmd_reset(),
            Command::Autofill => self.cmd_autofill()?,
            Command::Save(path) => self.cmd_save(&path)?,
            Command::Hint(x, y) => self.cmd_hint(x, y)?,
            Command::GuessHint(x, y) => self.cmd_guess_hint(x, y)?,
            Command::Solve(_) | Command::Edit(_) | Command::Exit => unreachable!(),
        };
        Ok(Outcome::Printed(text))
    }

    fn cmd_solve(&mut self, path: &Path) -> Result<String> {
        let board = io::read_puzzle(path, true)
            .map_err(|_| Error::Io("File doesn't exist or cannot be opened".into()))?;
        self.free_game();
        self.board = Some(board);
        self.history = Some(History::new());
        self.mode = Mode::Solve;
        Ok(self.render())
    }

    fn cmd_edit(&mut self, path: Option<&Path>) -> Result<String> {
        let board = match path {
            Some(p) => io::read_puzzle(p, false)
                .map_err(|_| Error::Io("File cannot be opened".into()))?,
            None => Board::empty(3, 3),
        };
        self.free_game();
        self.board = Some(board);
        self.history = Some(History::new());
        self.mode = Mode::Edit;
        Ok(self.render())
    }

    fn cmd_mark_errors(&mut self, param: Option<i64>) -> Result<String> {
        match param {
            Some(0) => self.mark_errors = false,
            Some(1) => self.mark_errors = true,
            _ => return Err(Error::InvalidParameter("the value should be 0 or 1".into())),
        }
        Ok(String::new())
    }

    /// Solve mode honors the user's `mark_errors` toggle; Edit mode always
    /// shows error marks, since the toggle doesn't apply there.
    fn render(&mut self) -> String {
        let mark_errors = match self.mode {
            Mode::Solve => self.mark_errors,
            _ => true,
        };
        let board = self.board.as_mut().expect("board loaded under mode gate");
        board.refresh_errors();
        printer::render(board, mark_errors)
    }

    fn cmd_set(&mut self, x: Option<i64>, y: Option<i64>, z: Option<i64>) -> Result<String> {
        let n = require(&mut self.board, &mut self.history)?.0.n() as i64;
        let (row, col, z) = match (x, y, z) {
            (Some(x), Some(y), Some(z))
                if (1..=n).contains(&x) && (1..=n).contains(&y) && (0..=n).contains(&z) =>
            {
                // Command parameters are column, row; the board is row, col.
                (y as usize - 1, x as usize - 1, z as usize)
            }
            _ => return Err(Error::InvalidParameter(format!("value not in range 0-{}", n))),
        };

        let mode = self.mode;
        let (board, history) = require(&mut self.board, &mut self.history)?;
        if mode == Mode::Solve && board.is_fixed(row, col) {
            return Err(Error::InvalidCellState("cell is fixed"));
        }

        let before = board.get(row, col);
        if before != z {
            board.set(row, col, z);
            history.append(sudoku_core::Move::single(row, col, before, z));
        }

        let mut out = self.render();
        out.push_str(&self.completion_check()?);
        Ok(out)
    }

    /// Shared by `set` and `autofill`: only in Solve, only when the board
    /// has just become full, run the ILP check and either declare victory
    /// (returning to Init) or flag the completed board as erroneous.
    fn completion_check(&mut self) -> Result<String> {
        if self.mode != Mode::Solve {
            return Ok(String::new());
        }
        let (board, _) = require(&mut self.board, &mut self.history)?;
        if board.empty_cells_num() != 0 {
            return Ok(String::new());
        }
        trace!("completion check: board is full, running ILP");
        let outcome = self.backend.solve_ilp(board)?;
        match outcome {
            IlpOutcome::Solvable(_) => {
                let msg = "Puzzle solved successfully\n".to_string();
                self.free_game();
                Ok(msg)
            }
            IlpOutcome::Unsolvable => Ok("Puzzle solution erroneous\n".to_string()),
        }
    }

    fn cmd_validate(&mut self) -> Result<String> {
        let (board, _) = require(&mut self.board, &mut self.history)?;
        if board.refresh_errors() {
            return Err(Error::InvalidCellState("board contains erroneous values"));
        }
        trace!("validate: running ILP existence check");
        match self.backend.solve_ilp(board)? {
            IlpOutcome::Solvable(_) => Ok("Validation passed: board is solvable\n".to_string()),
            IlpOutcome::Unsolvable => Ok("Validation failed: board is unsolvable\n".to_string()),
        }
    }

    fn cmd_generate(&mut self, x: Option<i64>, y: Option<i64>) -> Result<String> {
        let e = {
            let (board, _) = require(&mut self.board, &mut self.history)?;
            (board.n() * board.n()) as i64
        };
        let (x, y) = match (x, y) {
            (Some(x), Some(y)) if (0..=e).contains(&x) && (0..=e).contains(&y) => {
                (x as usize, y as usize)
            }
            _ => return Err(Error::InvalidParameter(format!("value not in range 0-{}", e))),
        };
        {
            let (board, _) = require(&mut self.board, &mut self.history)?;
            if board.empty_cells_num() < x {
                return Err(Error::InvalidCellState("number of empty cells too low"));
            }
        }

        let (board, history) = require(&mut self.board, &mut self.history)?;
        trace!("generate: planting {} clues, keeping {}", x, y);
        sudoku_core::generator::generate(board, history, &mut self.rng, self.backend.as_ref(), x, y)?;
        Ok(self.render())
    }

    fn cmd_guess(&mut self, t: Option<f64>) -> Result<String> {
        let t = t.ok_or_else(|| Error::InvalidParameter("the value should be from 0 to 1".into()))?;
        {
            let (board, _) = require(&mut self.board, &mut self.history)?;
            if board.refresh_errors() {
                return Err(Error::InvalidCellState("board contains erroneous values"));
            }
        }
        let (board, history) = require(&mut self.board, &mut self.history)?;
        trace!("guess: threshold {}", t);
        sudoku_core::guess::guess(board, history, &mut self.rng, self.backend.as_ref(), t)?;
        Ok(self.render())
    }

    fn cmd_undo(&mut self) -> Result<String> {
        let mv = {
            let (board, history) = require(&mut self.board, &mut self.history)?;
            if !history.can_undo() {
                return Err(Error::InvalidCellState("no moves to undo"));
            }
            history.undo(board).clone()
        };
        let mut out = self.render();
        for c in &mv.changes {
            out.push_str(&format!(
                "Undo {},{}: from {} to {}\n",
                c.col + 1,
                c.row + 1,
                c.after,
                c.before
            ));
        }
        Ok(out)
    }

    fn cmd_redo(&mut self) -> Result<String> {
        let mv = {
            let (board, history) = require(&mut self.board, &mut self.history)?;
            if !history.can_redo() {
                return Err(Error::InvalidCellState("no moves to redo"));
            }
            history.redo(board).clone()
        };
        let mut out = self.render();
        for c in &mv.changes {
            out.push_str(&format!(
                "Redo {},{}: from {} to {}\n",
                c.col + 1,
                c.row + 1,
                c.before,
                c.after
            ));
        }
        Ok(out)
    }

    fn cmd_num_solutions(&mut self) -> Result<String> {
        let (board, _) = require(&mut self.board, &mut self.history)?;
        if board.refresh_errors() {
            return Err(Error::InvalidCellState("board contains erroneous values"));
        }
        trace!("num_solutions: running backtracking enumerator");
        let n = sudoku_core::backtrack::count_all(board);
        Ok(format!("Number of solutions: {}\n", n))
    }

    fn cmd_reset(&mut self) -> String {
        let (board, history) =
            require(&mut self.board, &mut self.history).expect("mode gate guarantees a board");
        history.reset(board);
        self.render()
    }

    fn cmd_autofill(&mut self) -> Result<String> {
        let snapshot = {
            let (board, _) = require(&mut self.board, &mut self.history)?;
            if board.refresh_errors() {
                return Err(Error::InvalidCellState("board contains erroneous values"));
            }
            board.clone()
        };

        // Plan against the pre-autofill snapshot so the pass doesn't chain:
        // a cell only uniquely determined after another fill waits a round.
        let n = snapshot.n();
        let mut changes = Vec::new();
        let mut lines = String::new();
        for row in 0..n {
            for col in 0..n {
                if snapshot.get(row, col) != 0 {
                    continue;
                }
                let legal = snapshot.legal_values(row, col);
                if legal.len() == 1 {
                    let v = legal[0];
                    changes.push(sudoku_core::Change {
                        row,
                        col,
                        before: 0,
                        after: v,
                    });
                    lines.push_str(&format!("Cell <{},{}> set to {}\n", col + 1, row + 1, v));
                }
            }
        }

        if !changes.is_empty() {
            let (board, history) = require(&mut self.board, &mut self.history)?;
            for c in &changes {
                board.set(c.row, c.col, c.after);
            }
            history.append(sudoku_core::Move { changes });
        }

        let mut out = lines;
        out.push_str(&self.render());
        out.push_str(&self.completion_check()?);
        Ok(out)
    }

    fn cmd_save(&mut self, path: &Path) -> Result<String> {
        let mode = self.mode;
        if mode == Mode::Edit {
            let (board, _) = require(&mut self.board, &mut self.history)?;
            if board.refresh_errors() {
                return Err(Error::InvalidCellState("board contains erroneous values"));
            }
            trace!("save: running ILP validity check before writing");
            match self.backend.solve_ilp(board)? {
                IlpOutcome::Unsolvable => {
                    return Err(Error::InvalidCellState("board validation failed"))
                }
                IlpOutcome::Solvable(_) => {}
            }
        }

        // Edit-mode saves write every filled cell as a clue, regardless of
        // the in-memory fixed table; Solve-mode saves keep the real one.
        let (board, _) = require(&mut self.board, &mut self.history)?;
        let mut to_write = board.clone();
        if mode == Mode::Edit {
            let n = to_write.n();
            for i in 0..n {
                for j in 0..n {
                    let filled = to_write.get(i, j) != 0;
                    to_write.set_fixed(i, j, filled);
                }
            }
        }

        io::write_puzzle(path, &to_write)
            .map_err(|_| Error::Io("File cannot be created or modified".into()))?;
        Ok(format!("Saved in file: {}\n", path.display()))
    }

    fn hint_checks(&mut self, x: Option<i64>, y: Option<i64>) -> Result<(usize, usize)> {
        let (board, _) = require(&mut self.board, &mut self.history)?;
        let n = board.n() as i64;
        let (row, col) = match (x, y) {
            (Some(x), Some(y)) if (1..=n).contains(&x) && (1..=n).contains(&y) => {
                (y as usize - 1, x as usize - 1)
            }
            _ => return Err(Error::InvalidParameter(format!("value not in range 1-{}", n))),
        };
        if board.refresh_errors() {
            return Err(Error::InvalidCellState("board contains erroneous values"));
        }
        if board.is_fixed(row, col) {
            return Err(Error::InvalidCellState("cell is fixed"));
        }
        if board.get(row, col) != 0 {
            return Err(Error::InvalidCellState("cell already contains a value"));
        }
        Ok((row, col))
    }

    /// Read-only: peeks at the ILP completion's value for one cell. Neither
    /// mutates the board nor records history.
    fn cmd_hint(&mut self, x: Option<i64>, y: Option<i64>) -> Result<String> {
        let (row, col) = self.hint_checks(x, y)?;
        let (board, _) = require(&mut self.board, &mut self.history)?;
        trace!("hint: running ILP for cell ({}, {})", row, col);
        match self.backend.solve_ilp(board)? {
            IlpOutcome::Unsolvable => Err(Error::InvalidCellState("board is unsolvable")),
            IlpOutcome::Solvable(solved) => {
                Ok(format!("Hint: set cell to {}\n", solved.get(row, col)))
            }
        }
    }

    /// Read-only: lists every legal value for one cell with its LP score.
    fn cmd_guess_hint(&mut self, x: Option<i64>, y: Option<i64>) -> Result<String> {
        let (row, col) = self.hint_checks(x, y)?;
        let (board, _) = require(&mut self.board, &mut self.history)?;
        let n = board.n();
        trace!("guess_hint: running LP for cell ({}, {})", row, col);
        match self.backend.solve_lp(board)? {
            LpOutcome::Unsolvable => Err(Error::InvalidCellState("board is unsolvable")),
            LpOutcome::Solvable(scores) => {
                let mut out = format!(
                    "The legal values (and their scores) for {} {}:\n",
                    col + 1,
                    row + 1
                );
                for k in 0..n {
                    let score = scores[row * n * n + col * n + k];
                    if score > 0.0 {
                        out.push_str(&format!("value: {} score: {}\n", k + 1, score));
                    }
                }
                Ok(out)
            }
        }
    }
}

fn mode_req(cmd: &Command) -> ModeReq {
    match cmd {
        Command::PrintBoard
        | Command::Validate
        | Command::Undo
        | Command::Redo
        | Command::NumSolutions
        | Command::Reset
        | Command::Save(_)
        | Command::Set(..) => ModeReq::SolveOrEdit,
        Command::MarkErrors(_)
        | Command::Hint(..)
        | Command::Guess(_)
        | Command::GuessHint(..)
        | Command::Autofill => ModeReq::SolveOnly,
        Command::Generate(..) => ModeReq::EditOnly,
        Command::Solve(_) | Command::Edit(_) | Command::Exit => ModeReq::Any,
    }
}

/// The caller logs fatal errors and exits; user-visible errors just get
/// logged at debug level, since they're expected traffic, not exceptions.
pub fn log_error(err: &Error) {
    if err.is_fatal() {
        error!("fatal: {}", err);
    } else {
        debug!("command rejected: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sudoku_core::MockBackend;

    fn fresh_solve_state(board: Board) -> GameState {
        let mut gs = GameState::new(Rng::from_seed(1), Box::new(MockBackend));
        gs.board = Some(board);
        gs.history = Some(History::new());
        gs.mode = Mode::Solve;
        gs
    }

    #[test]
    fn set_refuses_fixed_cell_in_solve_mode() {
        let mut board = Board::empty(1, 1);
        board.set(0, 0, 1);
        board.set_fixed(0, 0, true);
        let mut gs = fresh_solve_state(board);
        let err = gs.cmd_set(Some(1), Some(1), Some(1)).unwrap_err();
        assert!(matches!(err, Error::InvalidCellState(_)));
    }

    #[test]
    fn set_suppresses_no_op_history_entry() {
        let mut board = Board::empty(2, 2);
        board.set(0, 0, 1);
        let mut gs = fresh_solve_state(board);
        gs.cmd_set(Some(1), Some(1), Some(1)).unwrap();
        assert!(!gs.history.as_ref().unwrap().can_undo());
    }

    #[test]
    fn set_completes_puzzle_and_returns_to_init() {
        // 1x1 board: a single set immediately completes the puzzle.
        let board = Board::empty(1, 1);
        let mut gs = fresh_solve_state(board);
        let out = gs.cmd_set(Some(1), Some(1), Some(1)).unwrap();
        assert!(out.contains("Puzzle solved successfully"));
        assert_eq!(gs.mode(), Mode::Init);
    }

    #[test]
    fn undo_reports_from_after_to_before() {
        let board = Board::empty(2, 2);
        let mut gs = fresh_solve_state(board);
        gs.cmd_set(Some(1), Some(1), Some(2)).unwrap();
        let out = gs.cmd_undo().unwrap();
        assert!(out.contains("Undo 1,1: from 2 to 0"));
    }

    #[test]
    fn mark_errors_rejects_out_of_range_values() {
        let board = Board::empty(2, 2);
        let mut gs = fresh_solve_state(board);
        let err = gs.cmd_mark_errors(Some(7)).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn generate_rejects_x_above_empty_cell_count() {
        let mut board = Board::empty(2, 2);
        board.set(0, 0, 1);
        board.set(0, 1, 2);
        board.set(1, 0, 3);
        let mut gs = fresh_solve_state(board);
        let err = gs.cmd_generate(Some(2), Some(0)).unwrap_err();
        assert!(matches!(err, Error::InvalidCellState(_)));
    }

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("sudoku-cli-game-test-{}-{}", std::process::id(), name))
    }

    #[test]
    fn solve_mode_save_skips_the_erroneous_and_solvability_gate() {
        // Two 1s in the same row: erroneous, and with the row already
        // doubled-up the board can never be completed either. A Solve-mode
        // save still writes it as-is, matching the original's save() which
        // only runs update_erroneous/is_valid_board in Edit mode.
        let mut board = Board::empty(2, 2);
        board.set(0, 0, 1);
        board.set(0, 1, 1);
        let mut gs = fresh_solve_state(board);
        let path = scratch_path("solve-erroneous");
        let out = gs.cmd_save(&path).unwrap();
        assert!(out.contains("Saved in file"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn edit_mode_save_still_rejects_an_erroneous_board() {
        let mut board = Board::empty(2, 2);
        board.set(0, 0, 1);
        board.set(0, 1, 1);
        let mut gs = GameState::new(Rng::from_seed(1), Box::new(MockBackend));
        gs.board = Some(board);
        gs.history = Some(History::new());
        gs.mode = Mode::Edit;
        let path = scratch_path("edit-erroneous");
        let err = gs.cmd_save(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidCellState(_)));
    }
}
