//! Line tokenizer (§6): splits on whitespace, matches the command table,
//! and converts numeric tokens with the same narrow acceptance rules the
//! reference parser used — a malformed token becomes an out-of-range
//! parameter rather than a parse error, so the game engine's existing
//! range check produces the right message.

use std::path::PathBuf;

/// A fully tokenized command. Numeric parameters that failed to parse are
/// `None`, which the game engine's range check rejects uniformly alongside
/// genuinely out-of-range values.
#[derive(Debug, Clone)]
pub enum Command {
    Solve(PathBuf),
    Edit(Option<PathBuf>),
    MarkErrors(Option<i64>),
    PrintBoard,
    Set(Option<i64>, Option<i64>, Option<i64>),
    Validate,
    Generate(Option<i64>, Option<i64>),
    Guess(Option<f64>),
    Undo,
    Redo,
    NumSolutions,
    Reset,
    Autofill,
    Save(PathBuf),
    Hint(Option<i64>, Option<i64>),
    GuessHint(Option<i64>, Option<i64>),
    Exit,
}

/// What tokenizing a line produced.
pub enum Line {
    Command(Command),
    Blank,
    TooLong,
    Invalid,
}

const MAX_LINE_LENGTH: usize = 256;

pub fn tokenize(line: &str) -> Line {
    if line.len() > MAX_LINE_LENGTH {
        return Line::TooLong;
    }
    let mut tokens = line.split_whitespace();
    let Some(word) = tokens.next() else {
        return Line::Blank;
    };

    let cmd = match word {
        "solve" => tokens.next().map(|p| Command::Solve(PathBuf::from(p))),
        "edit" => Some(Command::Edit(tokens.next().map(PathBuf::from))),
        "mark_errors" => Some(Command::MarkErrors(tokens.next().and_then(parse_int))),
        "print_board" => Some(Command::PrintBoard),
        "set" => Some(Command::Set(
            tokens.next().and_then(parse_int),
            tokens.next().and_then(parse_int),
            tokens.next().and_then(parse_int),
        )),
        "validate" => Some(Command::Validate),
        "generate" => Some(Command::Generate(
            tokens.next().and_then(parse_int),
            tokens.next().and_then(parse_int),
        )),
        "guess" => Some(Command::Guess(tokens.next().and_then(parse_threshold))),
        "undo" => Some(Command::Undo),
        "redo" => Some(Command::Redo),
        "num_solutions" => Some(Command::NumSolutions),
        "reset" => Some(Command::Reset),
        "autofill" => Some(Command::Autofill),
        "save" => tokens.next().map(|p| Command::Save(PathBuf::from(p))),
        "hint" => Some(Command::Hint(
            tokens.next().and_then(parse_int),
            tokens.next().and_then(parse_int),
        )),
        "guess_hint" => Some(Command::GuessHint(
            tokens.next().and_then(parse_int),
            tokens.next().and_then(parse_int),
        )),
        "exit" => Some(Command::Exit),
        _ => None,
    };

    match cmd {
        // Trailing tokens beyond the ones a command consumes are as
        // malformed as too few: both collapse to "invalid command".
        Some(c) if tokens.next().is_none() => Line::Command(c),
        _ => Line::Invalid,
    }
}

/// Mirrors the reference tokenizer's `is_number`: only a bare sequence of
/// ASCII digits parses, so a leading `-` (or anything else) is rejected
/// rather than silently accepted as a negative number.
fn parse_int(tok: &str) -> Option<i64> {
    if !tok.is_empty() && tok.bytes().all(|b| b.is_ascii_digit()) {
        tok.parse().ok()
    } else {
        None
    }
}

/// Mirrors the reference tokenizer's narrow `is_float` acceptance for the
/// `guess` threshold: `0`/`1` parse directly, `0.` followed by digits
/// parses as that fraction, and any other digit-leading token is accepted
/// as `1.0` (the documented, brittle fallback — see the design notes).
fn parse_threshold(tok: &str) -> Option<f64> {
    match tok {
        "0" => return Some(0.0),
        "1" => return Some(1.0),
        _ => {}
    }
    if let Some(rest) = tok.strip_prefix("0.") {
        if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
            return tok.parse().ok();
        }
        return None;
    }
    if tok.starts_with("1.") || tok.as_bytes().first().is_some_and(u8::is_ascii_digit) {
        return Some(1.0);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_blank() {
        assert!(matches!(tokenize("   "), Line::Blank));
        assert!(matches!(tokenize(""), Line::Blank));
    }

    #[test]
    fn unknown_word_is_invalid() {
        assert!(matches!(tokenize("frobnicate"), Line::Invalid));
    }

    #[test]
    fn set_parses_three_integers() {
        match tokenize("set 1 2 3") {
            Line::Command(Command::Set(Some(1), Some(2), Some(3))) => {}
            _ => panic!("expected Set(1, 2, 3)"),
        }
    }

    #[test]
    fn set_rejects_negative_tokens_as_unparseable() {
        match tokenize("set -1 2 3") {
            Line::Command(Command::Set(None, Some(2), Some(3))) => {}
            _ => panic!("expected a None first parameter"),
        }
    }

    #[test]
    fn too_many_tokens_is_invalid() {
        assert!(matches!(tokenize("undo extra"), Line::Invalid));
    }

    #[test]
    fn edit_without_path_is_allowed() {
        assert!(matches!(tokenize("edit"), Line::Command(Command::Edit(None))));
    }

    #[test]
    fn guess_threshold_edge_cases() {
        assert_eq!(parse_threshold("0"), Some(0.0));
        assert_eq!(parse_threshold("1"), Some(1.0));
        assert_eq!(parse_threshold("0.5"), Some(0.5));
        assert_eq!(parse_threshold("1.5"), Some(1.0));
        assert_eq!(parse_threshold("7"), Some(1.0));
        assert_eq!(parse_threshold("abc"), None);
    }

    #[test]
    fn line_over_256_chars_is_too_long() {
        let line = "a".repeat(300);
        assert!(matches!(tokenize(&line), Line::TooLong));
    }
}
