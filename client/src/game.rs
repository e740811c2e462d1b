use crate::role::Role;
use log::{debug, info, warn};
use shared::{MatchState, Outcome, Phase, Side, TileId};
use thiserror::Error;

/// Why a local transition was refused. The message is shown to the user as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Spectators cannot play.")]
    NotAPlayer,
    #[error("The game has not started yet.")]
    NotStarted,
    #[error("The game has already started.")]
    AlreadyStarted,
    #[error("The game is over.")]
    GameOver,
    #[error("Waiting for a second player.")]
    NotEnoughPlayers,
    #[error("It is not your turn.")]
    NotYourTurn,
    #[error("Select a tile first.")]
    NoTileSelected,
    #[error("Tile {0} is not in your pool.")]
    TileNotInPool(TileId),
    #[error("There is no cell {0}.")]
    NoSuchCell(usize),
    #[error("Cell already filled.")]
    CellOccupied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOutcome {
    TurnPassed(Side),
    Finished(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Match not running; nothing happened
    Idle,
    Counted { side: Side, remaining: u32 },
    Finished(Outcome),
}

/// One client's copy of the match plus its local, unreplicated tile selection
#[derive(Debug, Clone)]
pub struct Game {
    state: MatchState,
    selected: Option<TileId>,
}

impl Game {
    pub fn new() -> Self {
        Self {
            state: MatchState::new(),
            selected: None,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn selected(&self) -> Option<TileId> {
        self.selected
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Back to a waiting match with full pools and clocks
    pub fn reset(&mut self) {
        self.state = MatchState::new();
        self.selected = None;
    }

    pub fn can_start(&self, role: Role, player_count: usize) -> bool {
        role.is_player() && self.phase() == Phase::Waiting && player_count >= 2
    }

    pub fn start(&mut self, role: Role, player_count: usize) -> Result<(), MoveError> {
        if !role.is_player() {
            return Err(MoveError::NotAPlayer);
        }
        match self.phase() {
            Phase::Waiting => {}
            Phase::Active => return Err(MoveError::AlreadyStarted),
            Phase::Finished => return Err(MoveError::GameOver),
        }
        if player_count < 2 {
            return Err(MoveError::NotEnoughPlayers);
        }

        self.state.timer_running = true;
        self.state.current_turn = Side::Left;
        info!("Match started by {}", role.label());
        Ok(())
    }

    /// Returns the acting side if `role` may move right now
    fn acting_side(&self, role: Role) -> Result<Side, MoveError> {
        let side = role.side().ok_or(MoveError::NotAPlayer)?;
        match self.phase() {
            Phase::Waiting => return Err(MoveError::NotStarted),
            Phase::Finished => return Err(MoveError::GameOver),
            Phase::Active => {}
        }
        if side != self.state.current_turn {
            return Err(MoveError::NotYourTurn);
        }
        Ok(side)
    }

    pub fn select_tile(&mut self, role: Role, tile: TileId) -> Result<(), MoveError> {
        let side = self.acting_side(role)?;
        if !self.state.pool(side).contains(&tile) {
            return Err(MoveError::TileNotInPool(tile));
        }

        self.selected = Some(tile);
        Ok(())
    }

    pub fn place(&mut self, role: Role, cell: usize) -> Result<PlaceOutcome, MoveError> {
        let side = self.acting_side(role)?;
        let tile = self.selected.ok_or(MoveError::NoTileSelected)?;

        // Peer snapshots are not length-checked, so the board may be short
        match self.state.board.get(cell) {
            None => return Err(MoveError::NoSuchCell(cell)),
            Some(Some(_)) => return Err(MoveError::CellOccupied),
            Some(None) => {}
        }
        let pool_index = self
            .state
            .pool(side)
            .iter()
            .position(|t| *t == tile)
            .ok_or(MoveError::TileNotInPool(tile))?;

        self.state.pool_mut(side).remove(pool_index);
        self.state.board[cell] = Some(tile);
        *self.state.score_mut(side) += 1;
        self.selected = None;
        debug!("{} placed tile {} on cell {}", side, tile, cell);

        if self.state.is_board_full() {
            return Ok(PlaceOutcome::Finished(self.finish()));
        }

        self.state.current_turn = side.other();
        Ok(PlaceOutcome::TurnPassed(self.state.current_turn))
    }

    /// Authoritative clock step for the active side
    pub fn tick(&mut self) -> TickOutcome {
        let Some((side, remaining)) = self.count_down() else {
            return TickOutcome::Idle;
        };

        if self.state.any_clock_expired() {
            return TickOutcome::Finished(self.finish());
        }
        TickOutcome::Counted { side, remaining }
    }

    /// Display-only clock step. Never finishes the match; the peer that owns
    /// the running clock reports the finish through replication.
    pub fn tick_passive(&mut self) -> TickOutcome {
        match self.count_down() {
            Some((side, remaining)) => TickOutcome::Counted { side, remaining },
            None => TickOutcome::Idle,
        }
    }

    fn count_down(&mut self) -> Option<(Side, u32)> {
        if self.phase() != Phase::Active {
            return None;
        }

        let side = self.state.current_turn;
        let clock = self.state.clock_mut(side);
        *clock = clock.saturating_sub(1);
        Some((side, *clock))
    }

    fn finish(&mut self) -> Outcome {
        if let Some(outcome) = self.state.winner.filter(|_| self.state.game_over) {
            return outcome;
        }

        let outcome = self.state.evaluate_winner();
        self.state.game_over = true;
        self.state.timer_running = false;
        self.state.winner = Some(outcome);
        self.selected = None;
        info!(
            "Match finished: {:?} (score {}-{}, clock {}-{})",
            outcome,
            self.state.left_score,
            self.state.right_score,
            self.state.left_time,
            self.state.right_time
        );
        outcome
    }

    /// Replaces the whole local match with a peer's snapshot
    pub fn apply_snapshot(&mut self, state: MatchState) {
        if !state.is_consistent() {
            warn!("Applying a snapshot whose board and pools do not partition the tiles");
        }
        self.state = state;
        self.selected = None;
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{BOARD_CELLS, START_CLOCK, TOTAL_TILES};
    use tokio_test::{assert_err, assert_ok};

    const LEFT: Role = Role::Player(Side::Left);
    const RIGHT: Role = Role::Player(Side::Right);

    fn started_game() -> Game {
        let mut game = Game::new();
        game.start(LEFT, 2).unwrap();
        game
    }

    fn first_free_cell(game: &Game) -> usize {
        game.state().board.iter().position(|c| c.is_none()).unwrap()
    }

    /// Plays one legal move for whoever is on turn
    fn play_any(game: &mut Game) -> PlaceOutcome {
        let side = game.state().current_turn;
        let role = Role::Player(side);
        let tile = game.state().pool(side)[0];
        game.select_tile(role, tile).unwrap();
        let cell = first_free_cell(game);
        game.place(role, cell).unwrap()
    }

    #[test]
    fn test_start_requires_player_role() {
        let mut game = Game::new();
        assert_eq!(game.start(Role::Spectator, 3), Err(MoveError::NotAPlayer));
        assert_eq!(game.phase(), Phase::Waiting);
    }

    #[test]
    fn test_start_requires_two_participants() {
        let mut game = Game::new();
        assert!(!game.can_start(LEFT, 1));
        assert_eq!(game.start(LEFT, 1), Err(MoveError::NotEnoughPlayers));
        assert_eq!(game.phase(), Phase::Waiting);
    }

    #[test]
    fn test_start_by_either_side() {
        let mut game = Game::new();
        assert!(game.can_start(RIGHT, 2));
        assert_ok!(game.start(RIGHT, 2));
        assert_eq!(game.phase(), Phase::Active);
        assert_eq!(game.state().current_turn, Side::Left);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut game = started_game();
        let before = game.state().clone();
        assert_eq!(game.start(LEFT, 2), Err(MoveError::AlreadyStarted));
        assert_eq!(game.state(), &before);
    }

    #[test]
    fn test_select_rules() {
        let mut game = Game::new();
        assert_eq!(game.select_tile(LEFT, 0), Err(MoveError::NotStarted));

        game.start(LEFT, 2).unwrap();
        assert_eq!(game.select_tile(RIGHT, 15), Err(MoveError::NotYourTurn));
        assert_eq!(game.select_tile(LEFT, 15), Err(MoveError::TileNotInPool(15)));
        assert_eq!(game.select_tile(Role::Spectator, 0), Err(MoveError::NotAPlayer));
        assert_ok!(game.select_tile(LEFT, 4));
        assert_eq!(game.selected(), Some(4));
    }

    #[test]
    fn test_place_moves_tile_and_passes_turn() {
        let mut game = started_game();
        game.select_tile(LEFT, 3).unwrap();

        assert_eq!(game.place(LEFT, 12), Ok(PlaceOutcome::TurnPassed(Side::Right)));
        assert_eq!(game.state().board[12], Some(3));
        assert!(!game.state().left_pool.contains(&3));
        assert_eq!(game.state().left_score, 1);
        assert_eq!(game.state().current_turn, Side::Right);
        assert_eq!(game.selected(), None);
        assert!(game.state().is_consistent());
    }

    #[test]
    fn test_place_keeps_pool_order() {
        let mut game = started_game();
        game.select_tile(LEFT, 1).unwrap();
        game.place(LEFT, 0).unwrap();
        assert_eq!(&game.state().left_pool[..3], &[0, 2, 3]);
    }

    #[test]
    fn test_place_without_selection_is_noop() {
        let mut game = started_game();
        let before = game.state().clone();
        assert_eq!(game.place(LEFT, 0), Err(MoveError::NoTileSelected));
        assert_eq!(game.state(), &before);
    }

    #[test]
    fn test_place_on_occupied_cell_is_noop() {
        let mut game = started_game();
        game.select_tile(LEFT, 0).unwrap();
        game.place(LEFT, 5).unwrap();

        game.select_tile(RIGHT, 20).unwrap();
        let before = game.state().clone();
        assert_eq!(game.place(RIGHT, 5), Err(MoveError::CellOccupied));
        assert_eq!(game.state(), &before);
        assert_eq!(game.selected(), Some(20));
        assert_eq!(MoveError::CellOccupied.to_string(), "Cell already filled.");
    }

    #[test]
    fn test_place_out_of_turn_is_noop() {
        let mut game = started_game();
        game.select_tile(LEFT, 0).unwrap();
        let before = game.state().clone();
        assert_eq!(game.place(RIGHT, 0), Err(MoveError::NotYourTurn));
        assert_eq!(game.place(Role::Spectator, 0), Err(MoveError::NotAPlayer));
        assert_eq!(game.state(), &before);
    }

    #[test]
    fn test_place_before_start_is_noop() {
        let mut game = Game::new();
        let before = game.state().clone();
        assert_eq!(game.place(LEFT, 0), Err(MoveError::NotStarted));
        assert_eq!(game.state(), &before);
    }

    #[test]
    fn test_place_out_of_range() {
        let mut game = started_game();
        game.select_tile(LEFT, 0).unwrap();
        assert_eq!(game.place(LEFT, BOARD_CELLS), Err(MoveError::NoSuchCell(BOARD_CELLS)));
    }

    #[test]
    fn test_place_past_end_of_short_replicated_board() {
        let mut game = started_game();
        let mut remote = game.state().clone();
        remote.board.truncate(10);
        game.apply_snapshot(remote);

        game.select_tile(LEFT, 0).unwrap();
        let before = game.state().clone();
        assert_eq!(game.place(LEFT, 20), Err(MoveError::NoSuchCell(20)));
        assert_eq!(game.state(), &before);
        assert_eq!(game.place(LEFT, 9), Ok(PlaceOutcome::TurnPassed(Side::Right)));
    }

    #[test]
    fn test_stale_selection_is_rejected() {
        let mut game = started_game();
        game.select_tile(LEFT, 0).unwrap();

        // A replicated state where tile 0 already left the pool
        let mut remote = game.state().clone();
        remote.left_pool.retain(|t| *t != 0);
        remote.board[9] = Some(0);
        game.state = remote;

        assert_err!(game.place(LEFT, 1));
        assert!(game.state().is_consistent());
    }

    #[test]
    fn test_scores_track_successful_places() {
        let mut game = started_game();
        for n in 1..=10 {
            play_any(&mut game);
            let state = game.state();
            assert_eq!(state.left_score + state.right_score, n);
            assert_eq!(state.occupied_cells(), n as usize);
            assert!(state.is_consistent());
        }
    }

    #[test]
    fn test_full_board_finishes_match() {
        let mut game = started_game();
        let mut last = None;
        for _ in 0..TOTAL_TILES {
            last = Some(play_any(&mut game));
        }

        // 15 moves each and equal clocks
        assert_eq!(last, Some(PlaceOutcome::Finished(Outcome::Tie)));
        assert_eq!(game.phase(), Phase::Finished);
        assert!(!game.state().timer_running);
        assert!(game.state().is_board_full());
        assert!(game.state().is_consistent());
        assert_eq!(game.start(LEFT, 2), Err(MoveError::GameOver));
        assert_eq!(game.select_tile(LEFT, 0), Err(MoveError::GameOver));
    }

    #[test]
    fn test_full_board_clock_tiebreak() {
        let mut game = started_game();
        for _ in 0..TOTAL_TILES - 1 {
            play_any(&mut game);
        }
        // Right is on turn with the last tile; spend some of left's time first
        game.state.left_time = 30;
        assert_eq!(play_any(&mut game), PlaceOutcome::Finished(Outcome::Right));
        assert_eq!(game.state().winner, Some(Outcome::Right));
    }

    #[test]
    fn test_tick_only_while_active() {
        let mut game = Game::new();
        assert_eq!(game.tick(), TickOutcome::Idle);
        assert_eq!(game.state().left_time, START_CLOCK);
    }

    #[test]
    fn test_tick_decrements_active_side_only() {
        let mut game = started_game();
        assert_eq!(
            game.tick(),
            TickOutcome::Counted {
                side: Side::Left,
                remaining: START_CLOCK - 1
            }
        );
        assert_eq!(game.state().right_time, START_CLOCK);

        play_any(&mut game);
        game.tick();
        assert_eq!(game.state().left_time, START_CLOCK - 1);
        assert_eq!(game.state().right_time, START_CLOCK - 1);
    }

    #[test]
    fn test_clock_expiry_finishes_once() {
        let mut game = started_game();
        game.select_tile(LEFT, 0).unwrap();
        game.place(LEFT, 0).unwrap();
        game.state.right_time = 2;

        assert!(matches!(game.tick(), TickOutcome::Counted { remaining: 1, .. }));
        // Left leads on score, so left wins even though right's clock ran out
        assert_eq!(game.tick(), TickOutcome::Finished(Outcome::Left));
        assert_eq!(game.state().right_time, 0);
        assert_eq!(game.phase(), Phase::Finished);

        assert_eq!(game.tick(), TickOutcome::Idle);
        assert_eq!(game.state().right_time, 0);
        assert_eq!(game.state().winner, Some(Outcome::Left));
    }

    #[test]
    fn test_tick_floors_at_zero() {
        let mut game = started_game();
        game.state.left_time = 0;
        assert_eq!(game.tick_passive(), TickOutcome::Counted { side: Side::Left, remaining: 0 });
        assert_eq!(game.state().left_time, 0);
        assert_eq!(game.phase(), Phase::Active);
    }

    #[test]
    fn test_passive_tick_never_finishes() {
        let mut game = started_game();
        game.state.left_time = 1;
        game.tick_passive();
        assert_eq!(game.state().left_time, 0);
        assert_eq!(game.phase(), Phase::Active);
    }

    #[test]
    fn test_finish_is_not_reentered() {
        let mut game = started_game();
        game.state.left_time = 1;
        assert_eq!(game.tick(), TickOutcome::Finished(Outcome::Right));

        // Changing scores afterwards does not re-evaluate
        game.state.left_score = 10;
        assert_eq!(game.finish(), Outcome::Right);
    }

    #[test]
    fn test_apply_snapshot_replaces_and_clears_selection() {
        let mut game = started_game();
        game.select_tile(LEFT, 2).unwrap();

        let mut remote = MatchState::new();
        remote.timer_running = true;
        remote.current_turn = Side::Right;
        remote.left_pool.retain(|t| *t != 7);
        remote.board[0] = Some(7);
        remote.left_score = 1;

        game.apply_snapshot(remote.clone());
        assert_eq!(game.state(), &remote);
        assert_eq!(game.selected(), None);
    }

    #[test]
    fn test_reset() {
        let mut game = started_game();
        play_any(&mut game);
        game.reset();
        assert_eq!(game.state(), &MatchState::new());
        assert_eq!(game.selected(), None);
    }
}
