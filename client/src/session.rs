//! The one object that owns a client's match
//!
//! Every input (relay frame, timer tick, typed command, assets-ready signal)
//! goes through `Session::handle` one at a time. Handlers return the frames
//! to push to the relay; the caller performs the I/O.

use crate::game::{Game, MoveError, PlaceOutcome, TickOutcome};
use crate::input::{Command, HELP};
use crate::replication::{Inbound, Replicator};
use crate::role::{Role, RoleAssignment};
use crate::timer;
use log::{debug, error, info};
use shared::{MatchState, Phase};

const WELCOME: &str = "Connect two players, then type `start` to begin.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Transport opened
    Connected,
    /// Text frame from the relay
    ServerText(String),
    Tick,
    Command(Command),
    /// Everything the renderer needs is loaded; resets the match
    AssetsReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    None,
    Clocks,
    Full,
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub frames: Vec<String>,
    pub redraw: Redraw,
    pub quit: bool,
}

impl Update {
    fn none() -> Self {
        Self {
            frames: Vec::new(),
            redraw: Redraw::None,
            quit: false,
        }
    }

    fn redraw(redraw: Redraw) -> Self {
        Self {
            redraw,
            ..Self::none()
        }
    }

    fn broadcast(frame: Option<String>) -> Self {
        Self {
            frames: frame.into_iter().collect(),
            redraw: Redraw::Full,
            quit: false,
        }
    }
}

pub struct Session {
    replicator: Replicator,
    roles: RoleAssignment,
    player_count: usize,
    game: Game,
    status: String,
}

impl Session {
    pub fn new(player_id: impl Into<String>) -> Self {
        Self {
            replicator: Replicator::new(player_id),
            roles: RoleAssignment::new(),
            player_count: 0,
            game: Game::new(),
            status: WELCOME.to_string(),
        }
    }

    pub fn player_id(&self) -> &str {
        self.replicator.player_id()
    }

    pub fn role(&self) -> Option<Role> {
        self.roles.role()
    }

    pub fn player_count(&self) -> usize {
        self.player_count
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn state(&self) -> &MatchState {
        self.game.state()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Whether the start command would currently be accepted
    pub fn can_start(&self) -> bool {
        self.role()
            .is_some_and(|role| self.game.can_start(role, self.player_count))
    }

    pub fn handle(&mut self, event: Event) -> Update {
        match event {
            Event::Connected => Update {
                frames: self.encode(self.replicator.join_frame()).into_iter().collect(),
                ..Update::none()
            },
            Event::ServerText(text) => self.on_server_text(&text),
            Event::Tick => self.on_tick(),
            Event::Command(command) => self.on_command(command),
            Event::AssetsReady => {
                self.game.reset();
                self.status = WELCOME.to_string();
                Update::redraw(Redraw::Full)
            }
        }
    }

    fn on_server_text(&mut self, text: &str) -> Update {
        match self.replicator.decode(text) {
            Some(Inbound::PlayerCount(count)) => {
                self.player_count = count;
                if let Some(role) = self.roles.observe_count(count) {
                    self.status = role.greeting().to_string();
                }
                Update::redraw(Redraw::Full)
            }
            Some(Inbound::RemoteState(state)) => {
                let was = self.game.phase();
                Replicator::apply(&mut self.game, state);

                match (was, self.game.phase()) {
                    (_, Phase::Finished) => {
                        if let Some(outcome) = self.game.state().winner {
                            self.status = outcome.status_line();
                        }
                    }
                    (Phase::Waiting, Phase::Active) => {
                        self.status = "Game started! LEFT player's turn.".to_string();
                    }
                    (Phase::Active, Phase::Active) => {
                        let turn = self.game.state().current_turn;
                        self.status = format!("{} player's turn.", turn.shout());
                    }
                    _ => {}
                }
                Update::redraw(Redraw::Full)
            }
            None => Update::none(),
        }
    }

    fn on_tick(&mut self) -> Update {
        let role = self.role();
        match timer::drive(&mut self.game, role) {
            TickOutcome::Idle => Update::none(),
            TickOutcome::Counted { .. } => Update::redraw(Redraw::Clocks),
            TickOutcome::Finished(outcome) => {
                self.status = outcome.status_line();
                Update::broadcast(self.snapshot_frame())
            }
        }
    }

    fn on_command(&mut self, command: Command) -> Update {
        match command {
            Command::Start => self.start(),
            Command::Select(tile) => {
                let result = self.acting_role().and_then(|role| self.game.select_tile(role, tile));
                match result {
                    Ok(()) => self.status = format!("Tile {} selected.", tile),
                    Err(e) => self.status = e.to_string(),
                }
                Update::redraw(Redraw::Full)
            }
            Command::Place(cell) => {
                let result = self.acting_role().and_then(|role| self.game.place(role, cell));
                match result {
                    Ok(PlaceOutcome::TurnPassed(next)) => {
                        self.status = format!("{} player's turn.", next.shout());
                        Update::broadcast(self.snapshot_frame())
                    }
                    Ok(PlaceOutcome::Finished(outcome)) => {
                        self.status = outcome.status_line();
                        Update::broadcast(self.snapshot_frame())
                    }
                    Err(e) => {
                        self.status = e.to_string();
                        Update::redraw(Redraw::Full)
                    }
                }
            }
            Command::Help => {
                self.status = HELP.to_string();
                Update::redraw(Redraw::Full)
            }
            Command::Quit => Update {
                quit: true,
                ..Update::none()
            },
        }
    }

    fn start(&mut self) -> Update {
        let result = self
            .acting_role()
            .and_then(|role| self.game.start(role, self.player_count));

        match result {
            Ok(()) => {
                self.status = "Game started! LEFT player's turn.".to_string();
                Update::broadcast(self.snapshot_frame())
            }
            Err(e) => {
                debug!("Start ignored: {}", e);
                Update::none()
            }
        }
    }

    fn acting_role(&self) -> Result<Role, MoveError> {
        self.role().ok_or(MoveError::NotAPlayer)
    }

    fn snapshot_frame(&self) -> Option<String> {
        let frame = self.encode(self.replicator.snapshot_frame(self.game.state()));
        if frame.is_some() {
            info!("Broadcasting snapshot ({:?})", self.game.phase());
        }
        frame
    }

    fn encode(&self, frame: Result<String, serde_json::Error>) -> Option<String> {
        match frame {
            Ok(text) => Some(text),
            Err(e) => {
                error!("Failed to encode frame: {}", e);
                None
            }
        }
    }
}
