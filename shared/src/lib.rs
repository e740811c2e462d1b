use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const COLS: usize = 5;
pub const ROWS: usize = 6;
pub const BOARD_CELLS: usize = COLS * ROWS;
pub const TOTAL_TILES: u32 = 30;
pub const TILES_PER_SIDE: u32 = TOTAL_TILES / 2;
pub const START_CLOCK: u32 = 60;

pub type TileId = u32;

/// One of the two playing sides. Left always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Upper-case name used in status lines ("LEFT", "RIGHT")
    pub fn shout(self) -> &'static str {
        match self {
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Terminal result of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Left,
    Right,
    Tie,
}

impl Outcome {
    pub fn winner(self) -> Option<Side> {
        match self {
            Outcome::Left => Some(Side::Left),
            Outcome::Right => Some(Side::Right),
            Outcome::Tie => None,
        }
    }

    pub fn status_line(self) -> String {
        match self.winner() {
            Some(side) => format!("Game over: {} wins.", side.shout()),
            None => "Game over: tie (same score and same time left).".to_string(),
        }
    }

    pub fn announcement(self) -> &'static str {
        match self {
            Outcome::Left => "Winner: LEFT player",
            Outcome::Right => "Winner: RIGHT player",
            Outcome::Tie => "It's a tie!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Waiting,
    Active,
    Finished,
}

/// Full replicated match. Field names on the wire are camelCase to stay
/// compatible with the browser clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    pub board: Vec<Option<TileId>>,
    pub left_pool: Vec<TileId>,
    pub right_pool: Vec<TileId>,
    pub left_score: u32,
    pub right_score: u32,
    pub current_turn: Side,
    pub left_time: u32,
    pub right_time: u32,
    pub game_over: bool,
    pub winner: Option<Outcome>,
    pub timer_running: bool,
}

impl MatchState {
    /// Fresh waiting match: empty board, first half of the ids to the left
    /// pool, second half to the right pool, full clocks.
    pub fn new() -> Self {
        Self {
            board: vec![None; BOARD_CELLS],
            left_pool: (0..TILES_PER_SIDE).collect(),
            right_pool: (TILES_PER_SIDE..TOTAL_TILES).collect(),
            left_score: 0,
            right_score: 0,
            current_turn: Side::Left,
            left_time: START_CLOCK,
            right_time: START_CLOCK,
            game_over: false,
            winner: None,
            timer_running: false,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::Finished
        } else if self.timer_running {
            Phase::Active
        } else {
            Phase::Waiting
        }
    }

    pub fn pool(&self, side: Side) -> &[TileId] {
        match side {
            Side::Left => &self.left_pool,
            Side::Right => &self.right_pool,
        }
    }

    pub fn pool_mut(&mut self, side: Side) -> &mut Vec<TileId> {
        match side {
            Side::Left => &mut self.left_pool,
            Side::Right => &mut self.right_pool,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left_score,
            Side::Right => self.right_score,
        }
    }

    pub fn score_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Left => &mut self.left_score,
            Side::Right => &mut self.right_score,
        }
    }

    pub fn clock(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left_time,
            Side::Right => self.right_time,
        }
    }

    pub fn clock_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Left => &mut self.left_time,
            Side::Right => &mut self.right_time,
        }
    }

    pub fn occupied_cells(&self) -> usize {
        self.board.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_board_full(&self) -> bool {
        self.board.iter().all(|cell| cell.is_some())
    }

    pub fn any_clock_expired(&self) -> bool {
        self.left_time == 0 || self.right_time == 0
    }

    /// Higher score wins; on equal scores the larger remaining clock wins.
    pub fn evaluate_winner(&self) -> Outcome {
        if self.left_score != self.right_score {
            return if self.left_score > self.right_score {
                Outcome::Left
            } else {
                Outcome::Right
            };
        }

        if self.left_time > self.right_time {
            Outcome::Left
        } else if self.right_time > self.left_time {
            Outcome::Right
        } else {
            Outcome::Tie
        }
    }

    /// True when board and both pools partition the full tile range with no
    /// duplicates.
    pub fn is_consistent(&self) -> bool {
        let placed = self.board.iter().flatten();
        let all: Vec<TileId> = placed
            .chain(self.left_pool.iter())
            .chain(self.right_pool.iter())
            .copied()
            .collect();

        let unique: HashSet<TileId> = all.iter().copied().collect();
        unique.len() == all.len()
            && all.len() == TOTAL_TILES as usize
            && all.iter().all(|tile| *tile < TOTAL_TILES)
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Every frame exchanged through the relay, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    Join {
        id: String,
    },
    PlayerCount {
        count: usize,
    },
    State {
        id: String,
        #[serde(flatten)]
        state: MatchState,
    },
}

impl Message {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

pub fn cell_index(row: usize, col: usize) -> Option<usize> {
    if row < ROWS && col < COLS {
        Some(row * COLS + col)
    } else {
        None
    }
}
