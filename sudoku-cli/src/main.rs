//! The REPL binary: wires the CLI flags, the structured logger, the game
//! engine and the puzzle file format together into the read-eval-print loop
//! §4.9/§6 describe. Kept thin on purpose — every decision about commands
//! lives in `game`, not here.

mod command;
mod config;
mod game;
mod io;
mod printer;

use std::io::{BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use flexi_logger::Logger;
use log::{debug, info};
use sudoku_core::{GoodLpBackend, Rng};

use command::Line;
use config::Config;
use game::{GameState, Outcome};

const PROMPT: &str = "Enter a command:\n";

fn main() -> ExitCode {
    let config = Config::parse();

    let _logger = match Logger::try_with_str(config.log_spec()) {
        Ok(logger) => logger.log_to_stderr().start().ok(),
        Err(_) => None,
    };

    let rng = match config.seed {
        Some(seed) => Rng::from_seed(seed),
        None => Rng::from_entropy(),
    };
    let mut state = GameState::new(rng, Box::new(GoodLpBackend));

    if let Some(path) = &config.puzzle {
        info!("loading startup puzzle {}", path.display());
        match state.dispatch(command::Command::Solve(path.clone())) {
            Ok(Outcome::Printed(text)) => print!("{}", text),
            Ok(Outcome::Exit) => unreachable!("solve never requests exit"),
            Err(e) => {
                game::log_error(&e);
                println!("{}", e);
                if e.is_fatal() {
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    run_repl(&mut state)
}

fn run_repl(state: &mut GameState) -> ExitCode {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        let _ = write!(stdout, "{}", PROMPT);
        let _ = stdout.flush();

        let mut line = String::new();
        let bytes_read = match stdin.lock().read_line(&mut line) {
            Ok(n) => n,
            Err(_) => return ExitCode::SUCCESS,
        };
        if bytes_read == 0 {
            debug!("EOF on stdin, exiting");
            return ExitCode::SUCCESS;
        }
        let line = line.trim_end_matches(['\r', '\n']);

        match command::tokenize(line) {
            Line::Blank => continue,
            Line::TooLong => {
                println!("ERROR: Too many charcters in line");
                continue;
            }
            Line::Invalid => {
                println!("ERROR: invalid command");
                continue;
            }
            Line::Command(cmd) => match state.dispatch(cmd) {
                Ok(Outcome::Printed(text)) => print!("{}", text),
                Ok(Outcome::Exit) => return ExitCode::SUCCESS,
                Err(e) => {
                    game::log_error(&e);
                    println!("{}", e);
                    if e.is_fatal() {
                        return ExitCode::FAILURE;
                    }
                }
            },
        }
    }
}
