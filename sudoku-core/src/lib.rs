//! The constraint-solver and board-invariant core of the Sudoku workbench:
//! board primitives, history, the backtracking enumerator, the LP/ILP
//! formulation, the generator, and the guess engine. Command dispatch, mode
//! gating, file I/O and the REPL live one layer up, in `sudoku-cli`.

pub mod backtrack;
pub mod board;
pub mod error;
pub mod generator;
pub mod guess;
pub mod history;
pub mod model;
pub mod rng;

pub use board::Board;
pub use error::{Error, Result};
pub use history::{Change, History, Move};
pub use model::{GoodLpBackend, IlpOutcome, LpOutcome, MockBackend, SolverBackend};
pub use rng::Rng;
