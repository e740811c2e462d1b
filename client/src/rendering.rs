use crate::session::Session;
use shared::{MatchState, Phase, Side, TileId, COLS};
use std::io::{self, Write};

/// Plain-text view of a session, written to any `Write` sink
pub struct Renderer<W: Write> {
    out: W,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        let state = session.state();
        let role = session.role().map_or("?", |role| role.label());

        writeln!(self.out)?;
        writeln!(
            self.out,
            "you: {}   players: {}   turn: {}   {}",
            role,
            session.player_count(),
            state.current_turn,
            phase_label(state.phase())
        )?;
        self.draw_scoreline(state)?;
        self.draw_board(state)?;
        self.draw_pool(state, Side::Left, session.game().selected())?;
        self.draw_pool(state, Side::Right, session.game().selected())?;

        if let Some(outcome) = state.winner.filter(|_| state.game_over) {
            writeln!(self.out, "*** {} ***", outcome.announcement())?;
        } else if session.can_start() {
            writeln!(self.out, "(type `start` to begin)")?;
        }
        writeln!(self.out, "> {}", session.status())?;
        self.out.flush()
    }

    /// One-line refresh used on clock ticks
    pub fn render_clocks(&mut self, session: &Session) -> io::Result<()> {
        self.draw_scoreline(session.state())?;
        self.out.flush()
    }

    fn draw_scoreline(&mut self, state: &MatchState) -> io::Result<()> {
        writeln!(
            self.out,
            "LEFT  score {:>2}  time {:>2}s   |   RIGHT score {:>2}  time {:>2}s",
            state.left_score, state.left_time, state.right_score, state.right_time
        )
    }

    fn draw_board(&mut self, state: &MatchState) -> io::Result<()> {
        for row in state.board.chunks(COLS) {
            let cells: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Some(tile) => format!("[{:>2}]", tile),
                    None => "[  ]".to_string(),
                })
                .collect();
            writeln!(self.out, "  {}", cells.join(" "))?;
        }
        Ok(())
    }

    fn draw_pool(
        &mut self,
        state: &MatchState,
        side: Side,
        selected: Option<TileId>,
    ) -> io::Result<()> {
        let tiles: Vec<String> = state
            .pool(side)
            .iter()
            .map(|tile| {
                if Some(*tile) == selected {
                    format!("<{}>", tile)
                } else {
                    tile.to_string()
                }
            })
            .collect();
        writeln!(self.out, "{:<5} pool: {}", side.shout(), tiles.join(" "))
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Waiting => "waiting",
        Phase::Active => "running",
        Phase::Finished => "finished",
    }
}
