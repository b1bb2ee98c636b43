use thiserror::Error;

/// Every failure this crate can produce, split along the fatal / user-visible
/// line the game engine needs in order to decide between `PROCESS_SUCCESS`
/// and `PROCESS_FAIL`.
#[derive(Debug, Error)]
pub enum Error {
    /// The external solver reported an internal failure. Its allocations are
    /// not ours to reclaim, so this is fatal.
    #[error("solver failure")]
    SolverFail,

    /// Same as `SolverFail`, but from the continuous relaxation back-end.
    #[error("LP solver failure")]
    LpFail,

    /// A puzzle file could not be read or written.
    #[error("Error: {0}")]
    Io(String),

    /// A puzzle file was syntactically present but malformed.
    #[error("Error: {0}")]
    InvalidPuzzle(String),

    /// `generate` exhausted its retry budget.
    #[error("Error: puzzle generator failed")]
    GenerateFail,

    /// Tokenizer saw a command it doesn't recognise.
    #[error("ERROR: invalid command")]
    InvalidCommand,

    /// Command issued in a mode that doesn't support it. Carries the
    /// already-formatted "available in ..." clause.
    #[error("ERROR: command unavailable in current mode, it is {0}")]
    InvalidMode(&'static str),

    /// A parameter was outside its documented range.
    #[error("Error: {0}")]
    InvalidParameter(String),

    /// The board is in a state that refuses the requested action (fixed
    /// cell, cell already at that value, board currently erroneous, ...).
    #[error("Error: {0}")]
    InvalidCellState(&'static str),
}

impl Error {
    /// Fatal errors end the process (`PROCESS_FAIL`); everything else loops
    /// back to the REPL having changed no state (`PROCESS_SUCCESS`).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::SolverFail | Error::LpFail)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
