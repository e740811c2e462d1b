//! Whole-state replication over the relay
//!
//! After every local mutation the complete match is broadcast, tagged with
//! this session's id. A snapshot from any other id overwrites the local match
//! wholesale. There is no merge and no conflict detection: the turn order is
//! what keeps two clients from mutating at the same time.

use crate::game::Game;
use log::debug;
use rand::distributions::Alphanumeric;
use rand::Rng;
use shared::{MatchState, Message};

const PLAYER_ID_LEN: usize = 11;

/// Frames from the relay that the session cares about
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    PlayerCount(usize),
    RemoteState(MatchState),
}

pub struct Replicator {
    player_id: String,
}

impl Replicator {
    pub fn new(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
        }
    }

    /// Random lowercase alphanumeric session id
    pub fn generate_player_id() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(PLAYER_ID_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect()
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn join_frame(&self) -> Result<String, serde_json::Error> {
        Message::Join {
            id: self.player_id.clone(),
        }
        .to_json()
    }

    pub fn snapshot_frame(&self, state: &MatchState) -> Result<String, serde_json::Error> {
        Message::State {
            id: self.player_id.clone(),
            state: state.clone(),
        }
        .to_json()
    }

    /// Parses a relay frame. Noise, joins and our own echoed snapshots yield None.
    pub fn decode(&self, text: &str) -> Option<Inbound> {
        match Message::from_json(text) {
            Ok(Message::PlayerCount { count }) => Some(Inbound::PlayerCount(count)),
            Ok(Message::State { id, state }) => {
                if id == self.player_id {
                    debug!("Ignoring our own snapshot");
                    None
                } else {
                    Some(Inbound::RemoteState(state))
                }
            }
            Ok(Message::Join { id }) => {
                debug!("Peer {} announced itself", id);
                None
            }
            Err(e) => {
                debug!("Dropping unrecognised frame: {}", e);
                None
            }
        }
    }

    pub fn apply(game: &mut Game, state: MatchState) {
        game.apply_snapshot(state);
    }
}
