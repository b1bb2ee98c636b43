//! Process-startup configuration: read once by `main`, never re-read by the
//! game engine below it.

use std::path::PathBuf;

use clap::Parser;

/// Command-line flags accepted by the `sudoku` binary.
#[derive(Debug, Parser)]
#[command(name = "sudoku", about = "Interactive generalized Sudoku workbench")]
pub struct Config {
    /// Pin the RNG to a fixed seed, for deterministic runs and replays.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Raise log verbosity; repeatable (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Optional puzzle to load with `solve` semantics before the REPL starts.
    pub puzzle: Option<PathBuf>,
}

impl Config {
    /// The `flexi_logger` spec string implied by `-v`'s repeat count.
    pub fn log_spec(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
