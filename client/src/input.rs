//! Terminal command parsing, standing in for the browser's click handlers

use shared::{cell_index, TileId};
use thiserror::Error;

pub const HELP: &str = "commands: start | select <tile> | place <cell> | place <row> <col> | help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Select(TileId),
    Place(usize),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command `{0}`. Type `help`.")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("`{0}` is not a number.")]
    NotANumber(String),
    #[error("Row {0}, column {1} is off the board.")]
    OffBoard(usize, usize),
}

fn number<T: std::str::FromStr>(word: &str) -> Result<T, CommandError> {
    word.parse()
        .map_err(|_| CommandError::NotANumber(word.to_string()))
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((head, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match (head.to_ascii_lowercase().as_str(), args) {
        ("start", []) => Command::Start,
        ("start", _) => return Err(CommandError::Usage("start")),
        ("select" | "pick", [tile]) => Command::Select(number(tile)?),
        ("select" | "pick", _) => return Err(CommandError::Usage("select <tile>")),
        ("place" | "put", [cell]) => Command::Place(number(cell)?),
        ("place" | "put", [row, col]) => {
            let (row, col) = (number(row)?, number(col)?);
            Command::Place(cell_index(row, col).ok_or(CommandError::OffBoard(row, col))?)
        }
        ("place" | "put", _) => {
            return Err(CommandError::Usage("place <cell> | place <row> <col>"))
        }
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        (other, _) => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}
